use core::ffi::CStr;
use std::io::{self, SeekFrom};
use std::mem::ManuallyDrop;
use std::os::fd::{AsRawFd, RawFd};

use log::{debug, warn};

use crate::OpenFlags;

/// Turn a raw syscall return into an `io::Result`, picking the error up from `errno`.
fn check(ret: isize) -> io::Result<usize> {
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret as usize)
    }
}

/// An open descriptor owned by exactly one caller.
///
/// Dropping it closes the descriptor, so every early return releases it. Use
/// [`FileDescriptor::close`] when the close result matters.
#[derive(Debug)]
pub struct FileDescriptor {
    fd: usize,
}

impl FileDescriptor {
    /// Open an existing object. Never creates one.
    pub fn open(path: &CStr, flags: OpenFlags) -> io::Result<Self> {
        let fd = check(crate::open(path, flags))?;
        let (readable, writable) = flags.read_write();
        debug!("open {path:?} -> fd {fd} (r: {readable}, w: {writable})");
        Ok(Self { fd })
    }

    /// A single `write(2)`; a short count is returned as is.
    pub fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        check(crate::write(self.fd, buf))
    }

    /// A single `read(2)` at the current offset.
    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        check(crate::read(self.fd, buf))
    }

    /// Reposition the offset, returning the new one. Fails with `ESPIPE` on pipes.
    pub fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        check(crate::lseek(self.fd, pos)).map(|off| off as u64)
    }

    /// Current offset, or `None` if the object has no notion of one.
    pub fn position(&mut self) -> Option<u64> {
        self.seek(SeekFrom::Current(0)).ok()
    }

    /// Close and report the result. The descriptor is gone either way.
    pub fn close(self) -> io::Result<()> {
        let this = ManuallyDrop::new(self);
        check(crate::close(this.fd)).map(|_| ())
    }
}

impl AsRawFd for FileDescriptor {
    fn as_raw_fd(&self) -> RawFd {
        self.fd as RawFd
    }
}

impl Drop for FileDescriptor {
    fn drop(&mut self) {
        if crate::close(self.fd) < 0 {
            warn!(
                "close fd {} on drop: {}",
                self.fd,
                io::Error::last_os_error()
            );
        }
    }
}
