use crate::network::poll;
use crate::network::Poller;
use crate::server::connection::ConnTable;
use std::io;
use std::net::TcpListener;
use std::os::unix::io::AsRawFd;
use std::sync::{Condvar, Mutex};

/// Counted condition signal from the event loop to the accept coordinator.
/// The count makes a notify that lands while the coordinator is mid-accept
/// stick around instead of being lost.
pub struct AcceptSignal {
    pending: Mutex<usize>,
    cond: Condvar,
}

impl AcceptSignal {
    pub fn new() -> Self {
        Self { pending: Mutex::new(0), cond: Condvar::new() }
    }

    pub fn notify(&self) {
        let mut pending = self.pending.lock().unwrap();
        *pending += 1;
        drop(pending);
        self.cond.notify_one();
    }

    pub fn wait(&self) {
        let mut pending = self.pending.lock().unwrap();
        while *pending == 0 {
            pending = self.cond.wait(pending).unwrap();
        }
        *pending -= 1;
    }
}

/// Accept coordinator loop. One accept attempt per signal, so a connection
/// burst is admitted a connection at a time instead of draining the whole
/// listen backlog ahead of already-queued work.
pub fn run(
    listener: &TcpListener,
    poller: &Poller,
    connections: &ConnTable,
    signal: &AcceptSignal,
) {
    loop {
        signal.wait();

        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(e) = stream.set_nonblocking(true) {
                    eprintln!("[Network] set_nonblocking failed for {}: {}", peer, e);
                    continue;
                }

                let fd = stream.as_raw_fd();
                // The stream must be in the table before the first readiness
                // event can fire for its fd.
                connections.insert(fd, stream);
                if let Err(e) = poller.add(fd, poll::READABLE_EDGE) {
                    eprintln!("[Network] register failed for fd {}: {}", fd, e);
                    connections.take(fd);
                    continue;
                }
                println!("[Network] accepted {} as fd {}", peer, fd);
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                // raced with another wakeup, nothing pending
            }
            Err(e) => {
                eprintln!("[Network] accept failed: {}", e);
            }
        }
    }
}
