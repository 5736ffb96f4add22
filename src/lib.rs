pub mod config;
pub mod handlers;
pub mod http;
pub mod network;
pub mod server;

pub use crate::config::Config;

use crate::server::Server;
use std::io;
use std::net::SocketAddr;
use std::thread::{self, JoinHandle};

pub struct ServerHandle {
    pub addr: SocketAddr,
    pub handle: JoinHandle<()>,
}

/// Binds the listener (port 0 picks a free port) and serves on a background
/// thread, returning the bound address.
pub fn start_server(config: Config) -> io::Result<ServerHandle> {
    let mut server = Server::new(config)?;
    let addr = server.bind()?;
    let handle = thread::spawn(move || server.run());
    Ok(ServerHandle { addr, handle })
}
