//! Descriptor round-trip verification.
//!
//! Opens an existing path read-write, writes a payload through the descriptor,
//! reads back from the same descriptor and reports what came out. By default the
//! read happens at the post-write offset, exactly as a plain `write(2)` followed
//! by `read(2)` would; see [`Reposition`] for the rewinding variant.

use bitflags::bitflags;
use core::ffi::CStr;
use std::io::SeekFrom;

use syscall::*;

pub mod config;
mod error;
mod fd;
pub mod logging;
pub mod syscall;
mod verify;

pub use error::{Stage, VerifyError};
pub use fd::FileDescriptor;
pub use verify::{verify, Reposition, RoundTripVerifier, Verification};

/// Resolve relative paths against the current working directory.
pub const AT_FDCWD: isize = libc::AT_FDCWD as isize;

bitflags! {
    pub struct OpenFlags: u32 {
        const RDONLY = libc::O_RDONLY as u32;
        const WRONLY = libc::O_WRONLY as u32;
        const RDWR = libc::O_RDWR as u32;
        const CLOEXEC = libc::O_CLOEXEC as u32;
    }
}

impl OpenFlags {
    /// Return (readable, writable)
    pub fn read_write(&self) -> (bool, bool) {
        if self.contains(OpenFlags::RDWR) {
            (true, true)
        } else if self.contains(OpenFlags::WRONLY) {
            (false, true)
        } else {
            (true, false)
        }
    }
}

// syscall defs

pub fn open(path: &CStr, flags: OpenFlags) -> isize {
    sys_openat(AT_FDCWD, path, flags.bits())
}

pub fn close(fd: usize) -> isize {
    sys_close(fd)
}

pub fn read(fd: usize, buf: &mut [u8]) -> isize {
    sys_read(fd, buf)
}

pub fn write(fd: usize, buf: &[u8]) -> isize {
    sys_write(fd, buf)
}

pub fn lseek(fd: usize, pos: SeekFrom) -> isize {
    let (offset, whence) = match pos {
        SeekFrom::Start(off) => (off as i64, libc::SEEK_SET),
        SeekFrom::Current(off) => (off, libc::SEEK_CUR),
        SeekFrom::End(off) => (off, libc::SEEK_END),
    };
    sys_lseek(fd, offset, whence as u32)
}
