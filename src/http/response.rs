use std::io::{self, Write};

pub const SERVER_STRING: &str = "Server: microhttpd/0.1.0\r\n";

pub const STATUS_OK: &str = "HTTP/1.0 200 OK\r\n";

/// 200 header block for a static file. The body follows as raw bytes and
/// the connection close marks its end.
pub fn ok_headers(out: &mut impl Write) -> io::Result<()> {
    out.write_all(STATUS_OK.as_bytes())?;
    out.write_all(SERVER_STRING.as_bytes())?;
    out.write_all(b"Content-Type: text/html\r\n")?;
    out.write_all(b"\r\n")
}

pub fn bad_request(out: &mut impl Write) -> io::Result<()> {
    out.write_all(b"HTTP/1.0 400 BAD REQUEST\r\n")?;
    out.write_all(b"Content-type: text/html\r\n")?;
    out.write_all(b"\r\n")?;
    out.write_all(b"<P>Your browser sent a bad request, ")?;
    out.write_all(b"such as a POST without a Content-Length.\r\n")
}

pub fn not_found(out: &mut impl Write) -> io::Result<()> {
    out.write_all(b"HTTP/1.0 404 NOT FOUND\r\n")?;
    out.write_all(SERVER_STRING.as_bytes())?;
    out.write_all(b"Content-Type: text/html\r\n")?;
    out.write_all(b"\r\n")?;
    out.write_all(b"<HTML><TITLE>Not Found</TITLE>\r\n")?;
    out.write_all(b"<BODY><P>The server could not fulfill\r\n")?;
    out.write_all(b"your request because the resource specified\r\n")?;
    out.write_all(b"is unavailable or nonexistent.\r\n")?;
    out.write_all(b"</BODY></HTML>\r\n")
}

pub fn cannot_execute(out: &mut impl Write) -> io::Result<()> {
    out.write_all(b"HTTP/1.0 500 Internal Server Error\r\n")?;
    out.write_all(b"Content-type: text/html\r\n")?;
    out.write_all(b"\r\n")?;
    out.write_all(b"<P>Error prohibited CGI execution.\r\n")
}

pub fn unimplemented(out: &mut impl Write) -> io::Result<()> {
    out.write_all(b"HTTP/1.0 501 Method Not Implemented\r\n")?;
    out.write_all(SERVER_STRING.as_bytes())?;
    out.write_all(b"Content-Type: text/html\r\n")?;
    out.write_all(b"\r\n")?;
    out.write_all(b"<HTML><HEAD><TITLE>Method Not Implemented\r\n")?;
    out.write_all(b"</TITLE></HEAD>\r\n")?;
    out.write_all(b"<BODY><P>HTTP request method not supported.\r\n")?;
    out.write_all(b"</BODY></HTML>\r\n")
}
