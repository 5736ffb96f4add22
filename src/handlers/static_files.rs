use crate::http::response;
use crate::server::connection::Connection;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Serves a static file: the remaining request bytes are discarded, then
/// the header block and the file's exact bytes go out. A file that passed
/// the stat but cannot be read now still answers 404.
pub fn serve_file(conn: &mut Connection, path: &Path) -> io::Result<()> {
    conn.drain_request()?;

    match fs::read(path) {
        Ok(content) => {
            response::ok_headers(conn)?;
            conn.write_all(&content)
        }
        Err(_) => response::not_found(conn),
    }
}
