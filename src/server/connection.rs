use crate::network::Poller;
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Upper bound on a single request or header line. Anything longer is a
/// protocol error, not a reason to grow the buffer without limit.
pub const MAX_LINE: usize = 8192;

const READ_CHUNK: usize = 4096;

/// Accepted sockets waiting for a readiness event, keyed by fd. A worker
/// takes the stream out before processing, so a duplicate edge-triggered
/// event for the same fd finds the slot empty and is dropped as benign.
pub struct ConnTable {
    inner: Mutex<HashMap<RawFd, TcpStream>>,
}

impl ConnTable {
    pub fn new() -> Self {
        Self { inner: Mutex::new(HashMap::new()) }
    }

    pub fn insert(&self, fd: RawFd, stream: TcpStream) {
        self.inner.lock().unwrap().insert(fd, stream);
    }

    pub fn take(&self, fd: RawFd) -> Option<TcpStream> {
        self.inner.lock().unwrap().remove(&fd)
    }
}

/// One accepted socket, owned by exactly one worker for the duration of a
/// request. Reads are buffered; writes go straight through. Dropping the
/// connection deregisters the fd and closes the socket, on success and
/// error paths alike.
pub struct Connection {
    stream: TcpStream,
    poller: Arc<Poller>,
    fd: RawFd,
    buf: Vec<u8>,
    pos: usize,
}

impl Connection {
    pub fn new(stream: TcpStream, poller: Arc<Poller>, timeout: Duration) -> io::Result<Self> {
        // The acceptor left the socket non-blocking for the edge-triggered
        // registration; the worker does plain blocking I/O with a deadline.
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        let fd = stream.as_raw_fd();
        Ok(Self { stream, poller, fd, buf: Vec::new(), pos: 0 })
    }

    fn fill(&mut self) -> io::Result<usize> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.stream.read(&mut chunk)?;
        self.buf.clear();
        self.buf.extend_from_slice(&chunk[..n]);
        self.pos = 0;
        Ok(n)
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos >= self.buf.len() && self.fill()? == 0 {
            return Ok(None);
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(b))
    }

    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos >= self.buf.len() && self.fill()? == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf[self.pos]))
    }

    /// Reads one line, terminated by `\r\n` or a bare `\n`, and returns it
    /// without the terminator. End of stream yields whatever was
    /// accumulated, so both a blank line and a closed socket read as `""`.
    pub fn read_line(&mut self) -> io::Result<String> {
        let mut line = Vec::new();
        loop {
            let b = match self.next_byte()? {
                Some(b) => b,
                None => break,
            };
            match b {
                b'\n' => break,
                b'\r' => {
                    if self.peek_byte()? == Some(b'\n') {
                        self.next_byte()?;
                    }
                    break;
                }
                _ => {
                    if line.len() >= MAX_LINE {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "request line too long",
                        ));
                    }
                    line.push(b);
                }
            }
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    /// Reads and discards the rest of the request, up to the blank line
    /// ending the header block or the end of the stream.
    pub fn drain_request(&mut self) -> io::Result<()> {
        while !self.read_line()?.is_empty() {}
        Ok(())
    }

    /// Copies exactly `length` bytes of request body into `dest`, serving
    /// buffered leftovers before touching the socket again.
    pub fn copy_body(&mut self, length: usize, dest: &mut impl Write) -> io::Result<()> {
        let mut remaining = length;
        while remaining > 0 {
            if self.pos >= self.buf.len() && self.fill()? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "request body shorter than Content-Length",
                ));
            }
            let take = remaining.min(self.buf.len() - self.pos);
            dest.write_all(&self.buf[self.pos..self.pos + take])?;
            self.pos += take;
            remaining -= take;
        }
        Ok(())
    }
}

impl Write for Connection {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.stream.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.poller.delete(self.fd);
    }
}
