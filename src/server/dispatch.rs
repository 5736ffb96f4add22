use std::collections::VecDeque;
use std::os::unix::io::RawFd;
use std::sync::{Condvar, Mutex};

struct QueueState {
    ready: VecDeque<RawFd>,
    closed: bool,
}

/// FIFO hand-off between the event loop and the worker pool. The mutex
/// guards only the push/pop critical sections; request processing happens
/// with the lock released.
pub struct DispatchQueue {
    state: Mutex<QueueState>,
    cond: Condvar,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState { ready: VecDeque::new(), closed: false }),
            cond: Condvar::new(),
        }
    }

    pub fn push(&self, fd: RawFd) {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return;
        }
        state.ready.push_back(fd);
        drop(state);
        self.cond.notify_one();
    }

    /// Blocks until a handle is available. `None` means the queue was closed
    /// and drained, so the calling worker should exit.
    pub fn pop(&self) -> Option<RawFd> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(fd) = state.ready.pop_front() {
                return Some(fd);
            }
            if state.closed {
                return None;
            }
            state = self.cond.wait(state).unwrap();
        }
    }

    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        drop(state);
        self.cond.notify_all();
    }
}
