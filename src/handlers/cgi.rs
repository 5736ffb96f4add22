use crate::http::request::{Method, PendingRequest};
use crate::http::response;
use crate::server::connection::Connection;
use std::io::{self, Write};
use std::process::{Child, Command, Stdio};

/// Runs the target as a CGI program and relays the exchange.
///
/// GET: the rest of the request is discarded and the raw query string goes
/// to the child as QUERY_STRING. POST: the header block is scanned for
/// Content-Length (absent means 400, and nothing is spawned); exactly that
/// many body bytes are fed to the child's stdin. Either way the child sees
/// REQUEST_METHOD, talks over stdin/stdout only, and is reaped with a
/// blocking wait before the connection is released.
pub fn execute_cgi(conn: &mut Connection, req: &PendingRequest) -> io::Result<()> {
    let content_length = match req.method {
        Method::Get => {
            conn.drain_request()?;
            None
        }
        Method::Post => match read_content_length(conn)? {
            Some(n) => Some(n),
            None => {
                return response::bad_request(conn);
            }
        },
    };

    let mut command = Command::new(&req.path);
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .env("REQUEST_METHOD", req.method.as_str());
    match content_length {
        Some(n) => {
            command.env("CONTENT_LENGTH", n.to_string());
        }
        None => {
            command.env("QUERY_STRING", &req.query);
        }
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            eprintln!("[CGI Error] cannot execute {}: {}", req.path.display(), e);
            return response::cannot_execute(conn);
        }
    };

    // The status line goes out before any child output is known, as the
    // original protocol has it; the child is expected to emit its own
    // headers next.
    conn.write_all(response::STATUS_OK.as_bytes())?;

    let relayed = relay(conn, content_length, &mut child);
    if relayed.is_err() {
        // A dead client must not leave the child blocked on a full pipe.
        let _ = child.kill();
    }
    let _ = child.wait();
    relayed
}

fn relay(conn: &mut Connection, content_length: Option<usize>, child: &mut Child) -> io::Result<()> {
    if let Some(length) = content_length {
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "child stdin missing"))?;
        conn.copy_body(length, &mut stdin)?;
        // dropping stdin closes the pipe so the child sees EOF
    } else {
        drop(child.stdin.take());
    }

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "child stdout missing"))?;
    io::copy(&mut stdout, conn)?;
    Ok(())
}

/// Scans header lines up to the blank line for Content-Length. The header
/// name match is ASCII-case-insensitive; the rest of the headers are
/// discarded.
fn read_content_length(conn: &mut Connection) -> io::Result<Option<usize>> {
    let mut content_length = None;
    loop {
        let line = conn.read_line()?;
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse::<usize>().ok();
            }
        }
    }
    Ok(content_length)
}
