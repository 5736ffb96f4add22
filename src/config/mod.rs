pub mod models;
pub mod parser;

pub use models::Config;
pub use parser::parse_config;
