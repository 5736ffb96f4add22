use libc::{
    epoll_create1,
    epoll_ctl,
    epoll_event,
    epoll_wait,
    EPOLL_CLOEXEC,
    EPOLL_CTL_ADD,
    EPOLL_CTL_DEL,
    EPOLLET,
    EPOLLIN,
};
use std::io;
use std::os::unix::io::RawFd;

pub const READABLE: u32 = EPOLLIN as u32;
pub const READABLE_EDGE: u32 = (EPOLLIN | EPOLLET) as u32;

pub struct Poller {
    epoll_fd: RawFd,
}

impl Poller {
    pub fn new() -> io::Result<Self> {
        let fd = unsafe { epoll_create1(EPOLL_CLOEXEC) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { epoll_fd: fd })
    }

    pub fn add(&self, fd: RawFd, events: u32) -> io::Result<()> {
        let mut event = epoll_event { events, u64: fd as u64 };
        let res = unsafe { epoll_ctl(self.epoll_fd, EPOLL_CTL_ADD, fd, &mut event) };
        if res < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EEXIST) {
                return Ok(());
            }
            return Err(err);
        }
        Ok(())
    }

    // Removing a descriptor that is already gone is a no-op.
    pub fn delete(&self, fd: RawFd) -> io::Result<()> {
        let res = unsafe { epoll_ctl(self.epoll_fd, EPOLL_CTL_DEL, fd, std::ptr::null_mut()) };
        if res < 0 {
            match io::Error::last_os_error().raw_os_error() {
                Some(libc::ENOENT) | Some(libc::EBADF) => Ok(()),
                _ => Err(io::Error::last_os_error()),
            }
        } else {
            Ok(())
        }
    }

    pub fn wait(&self, events: &mut [epoll_event], timeout_ms: i32) -> io::Result<usize> {
        let res = unsafe {
            epoll_wait(self.epoll_fd, events.as_mut_ptr(), events.len() as i32, timeout_ms)
        };
        if res < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(0);
            }
            Err(err)
        } else {
            Ok(res as usize)
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.epoll_fd);
        }
    }
}
