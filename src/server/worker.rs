use crate::config::Config;
use crate::handlers::cgi;
use crate::handlers::static_files;
use crate::http::request::PendingRequest;
use crate::http::response;
use crate::network::Poller;
use crate::server::connection::{ConnTable, Connection};
use crate::server::dispatch::DispatchQueue;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Worker loop. Pops one ready handle at a time and runs the request to
/// completion; the connection is torn down when `Connection` drops, whether
/// the exchange succeeded or not. A pop whose fd is no longer in the table
/// was a duplicate readiness event and is skipped.
pub fn run(
    queue: &DispatchQueue,
    connections: &ConnTable,
    poller: &Arc<Poller>,
    config: &Config,
) {
    while let Some(fd) = queue.pop() {
        let stream = match connections.take(fd) {
            Some(stream) => stream,
            None => continue,
        };

        let timeout = Duration::from_secs(config.timeout_seconds);
        let conn = match Connection::new(stream, Arc::clone(poller), timeout) {
            Ok(conn) => conn,
            Err(e) => {
                eprintln!("[Worker] fd {}: {}", fd, e);
                continue;
            }
        };

        if let Err(e) = handle_request(conn, config) {
            eprintln!("[Worker] fd {}: {}", fd, e);
        }
    }
}

/// One full request lifecycle: request line, classification, path
/// resolution, then the static or CGI branch.
fn handle_request(mut conn: Connection, config: &Config) -> io::Result<()> {
    let line = match conn.read_line() {
        Ok(line) => line,
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return response::bad_request(&mut conn);
        }
        Err(e) => return Err(e),
    };

    let mut req = match PendingRequest::parse(&line, config) {
        Some(req) => req,
        None => {
            return response::unimplemented(&mut conn);
        }
    };

    if req.classify(config).is_err() {
        conn.drain_request()?;
        return response::not_found(&mut conn);
    }

    if req.cgi {
        cgi::execute_cgi(&mut conn, &req)
    } else {
        static_files::serve_file(&mut conn, &req.path)
    }
}
