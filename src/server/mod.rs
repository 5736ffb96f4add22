pub mod acceptor;
pub mod connection;
pub mod dispatch;
pub mod worker;

use crate::config::Config;
use crate::network::poll;
use crate::network::Poller;
use crate::server::acceptor::AcceptSignal;
use crate::server::connection::ConnTable;
use crate::server::dispatch::DispatchQueue;

use libc::epoll_event;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::Arc;
use std::thread;

const MAX_EVENTS: usize = 1024;
const POLL_TIMEOUT_MS: i32 = 10;

/// Server context: owns the listening socket, the epoll handle, and the
/// structures shared between the event loop, the accept coordinator, and
/// the worker pool.
pub struct Server {
    config: Arc<Config>,
    poller: Arc<Poller>,
    connections: Arc<ConnTable>,
    queue: Arc<DispatchQueue>,
    accept_signal: Arc<AcceptSignal>,
    listener: Option<Arc<TcpListener>>,
}

impl Server {
    pub fn new(config: Config) -> io::Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            poller: Arc::new(Poller::new()?),
            connections: Arc::new(ConnTable::new()),
            queue: Arc::new(DispatchQueue::new()),
            accept_signal: Arc::new(AcceptSignal::new()),
            listener: None,
        })
    }

    /// Binds the listening socket and registers it level-triggered. Errors
    /// here are fatal: the server cannot function without its listener.
    pub fn bind(&mut self) -> io::Result<SocketAddr> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)?;
        listener.set_nonblocking(true)?;
        self.poller.add(listener.as_raw_fd(), poll::READABLE)?;

        let local = listener.local_addr()?;
        println!("[Setup] listening on http://{}", local);
        self.listener = Some(Arc::new(listener));
        Ok(local)
    }

    /// Spawns the accept coordinator and the worker pool, then runs the
    /// event loop on the calling thread. Listener readiness signals the
    /// coordinator; client readiness enqueues the fd for the pool.
    pub fn run(mut self) {
        let listener = self.listener.take().expect("bind() must run before run()");
        let listen_fd = listener.as_raw_fd();

        {
            let listener = Arc::clone(&listener);
            let poller = Arc::clone(&self.poller);
            let connections = Arc::clone(&self.connections);
            let signal = Arc::clone(&self.accept_signal);
            thread::spawn(move || acceptor::run(&listener, &poller, &connections, &signal));
        }

        for _ in 0..self.config.worker_threads {
            let queue = Arc::clone(&self.queue);
            let connections = Arc::clone(&self.connections);
            let poller = Arc::clone(&self.poller);
            let config = Arc::clone(&self.config);
            thread::spawn(move || worker::run(&queue, &connections, &poller, &config));
        }

        println!(
            "[Reactor] event loop started, {} workers",
            self.config.worker_threads
        );

        let mut events = vec![epoll_event { events: 0, u64: 0 }; MAX_EVENTS];
        loop {
            let n = match self.poller.wait(&mut events, POLL_TIMEOUT_MS) {
                Ok(n) => n,
                Err(e) => {
                    eprintln!("[Reactor] epoll wait failed: {}", e);
                    continue;
                }
            };

            for event in &events[..n] {
                let fd = event.u64 as RawFd;
                if fd == listen_fd {
                    self.accept_signal.notify();
                } else {
                    self.queue.push(fd);
                }
            }
        }
    }
}
