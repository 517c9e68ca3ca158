use core::ffi::CStr;

const SYSCALL_OPENAT: libc::c_long = libc::SYS_openat;
const SYSCALL_CLOSE: libc::c_long = libc::SYS_close;
const SYSCALL_READ: libc::c_long = libc::SYS_read;
const SYSCALL_WRITE: libc::c_long = libc::SYS_write;
const SYSCALL_LSEEK: libc::c_long = libc::SYS_lseek;

/// Issue a raw syscall. A negative return means failure, details left in `errno`.
fn syscall(id: libc::c_long, args: [usize; 4]) -> isize {
    unsafe { libc::syscall(id, args[0], args[1], args[2], args[3]) as isize }
}

macro_rules! syscall {
    ($id:expr, $a0:expr) => {
        syscall($id, [$a0, 0, 0, 0])
    };
    ($id:expr, $a0:expr, $a1:expr) => {
        syscall($id, [$a0, $a1, 0, 0])
    };
    ($id:expr, $a0:expr, $a1:expr, $a2:expr) => {
        syscall($id, [$a0, $a1, $a2, 0])
    };
    ($id:expr, $a0:expr, $a1:expr, $a2:expr, $a3:expr) => {
        syscall($id, [$a0, $a1, $a2, $a3])
    };
}

/// `mode` is always 0: nothing here opens with `O_CREAT`.
pub fn sys_openat(dirfd: isize, path: &CStr, flags: u32) -> isize {
    syscall!(
        SYSCALL_OPENAT,
        dirfd as usize,
        path.as_ptr() as usize,
        flags as usize,
        0
    )
}

pub fn sys_close(fd: usize) -> isize {
    syscall!(SYSCALL_CLOSE, fd)
}

pub fn sys_read(fd: usize, buf: &mut [u8]) -> isize {
    syscall!(SYSCALL_READ, fd, buf.as_mut_ptr() as usize, buf.len())
}

pub fn sys_write(fd: usize, buf: &[u8]) -> isize {
    syscall!(SYSCALL_WRITE, fd, buf.as_ptr() as usize, buf.len())
}

pub fn sys_lseek(fd: usize, offset: i64, whence: u32) -> isize {
    syscall!(SYSCALL_LSEEK, fd, offset as usize, whence as usize)
}
