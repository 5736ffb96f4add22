use microhttpd::config::{self, Config};
use microhttpd::server::Server;
use std::path::Path;
use std::process;

const CONFIG_FILE: &str = "httpd.conf";

fn main() {
    // writes to a vanished client must surface as errors, not kill the process
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }

    let cfg = if Path::new(CONFIG_FILE).exists() {
        match config::parse_config(CONFIG_FILE) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Fatal Config Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("[Setup] no {} found, using defaults", CONFIG_FILE);
        Config::default()
    };

    let mut server = match Server::new(cfg) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[Fatal] {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = server.bind() {
        eprintln!("[Fatal] {}", e);
        process::exit(1);
    }

    server.run();
}
