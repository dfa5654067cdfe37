//! Edge notification backends
//!
//! A [`Selector`] watches a set of handles and reports which of them saw
//! an edge. [`Epoll`] is the Linux implementation, registering handles
//! edge-triggered so a GPIO value file reports each transition once.

use std::io;
use std::time::Duration;

use super::Handle;

/// Edge notification facility
pub trait Selector: Send {
    /// Starts watching `handle`.
    ///
    /// Edge-triggered interfaces may report the handle once right after
    /// registration without any transition having happened.
    fn register(&mut self, handle: Handle) -> io::Result<()>;

    /// Blocks for at most `timeout` and appends every handle that fired to
    /// `ready`. A zero timeout only collects what is already pending.
    fn wait(&mut self, ready: &mut Vec<Handle>, timeout: Duration) -> io::Result<()>;
}

#[cfg(any(target_os = "linux", target_os = "android"))]
pub use self::epoll::Epoll;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod epoll {
    use std::io;
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
    use std::time::Duration;

    use super::{Handle, Selector};

    /// `epoll(7)` selector
    ///
    /// Handles are registered for `EPOLLIN | EPOLLPRI` edge-triggered;
    /// sysfs GPIO value files signal edges through `EPOLLPRI`.
    pub struct Epoll {
        fd: OwnedFd,
        events: Vec<libc::epoll_event>,
    }

    impl Epoll {
        pub fn new() -> io::Result<Self> {
            // SAFETY: epoll_create1 takes no pointers
            let fd = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            // SAFETY: fd was just returned by epoll_create1 and is owned by nothing else
            let fd = unsafe { OwnedFd::from_raw_fd(fd) };
            Ok(Self {
                fd,
                events: Vec::new(),
            })
        }
    }

    impl Selector for Epoll {
        fn register(&mut self, handle: Handle) -> io::Result<()> {
            let mut event = libc::epoll_event {
                events: (libc::EPOLLIN | libc::EPOLLPRI | libc::EPOLLET) as u32,
                u64: handle as u64,
            };
            // SAFETY: event outlives the call; the kernel copies it
            let rc = unsafe {
                libc::epoll_ctl(self.fd.as_raw_fd(), libc::EPOLL_CTL_ADD, handle, &mut event)
            };
            if rc < 0 {
                return Err(io::Error::last_os_error());
            }
            self.events.push(libc::epoll_event { events: 0, u64: 0 });
            Ok(())
        }

        fn wait(&mut self, ready: &mut Vec<Handle>, timeout: Duration) -> io::Result<()> {
            if self.events.is_empty() {
                std::thread::sleep(timeout);
                return Ok(());
            }
            let timeout_ms = timeout_millis(timeout);
            // SAFETY: the pointer and length describe self.events, which is
            // not touched until the call returns
            let count = unsafe {
                libc::epoll_wait(
                    self.fd.as_raw_fd(),
                    self.events.as_mut_ptr(),
                    self.events.len() as i32,
                    timeout_ms,
                )
            };
            if count < 0 {
                let error = io::Error::last_os_error();
                if error.kind() == io::ErrorKind::Interrupted {
                    return Ok(());
                }
                return Err(error);
            }
            ready.extend(
                self.events[..count as usize]
                    .iter()
                    .map(|event| event.u64 as Handle),
            );
            Ok(())
        }
    }

    /// Whole milliseconds for `epoll_wait`, rounded up so that a nonzero
    /// timeout never becomes a busy poll
    fn timeout_millis(timeout: Duration) -> i32 {
        timeout.as_micros().div_ceil(1000).min(i32::MAX as u128) as i32
    }

}
