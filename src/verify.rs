use std::borrow::Cow;
use std::ffi::CString;
use std::fmt;
use std::io::{self, SeekFrom};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use log::{debug, trace, warn};

use crate::{FileDescriptor, OpenFlags, VerifyError};

/// Where the read starts relative to the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reposition {
    /// Read at whatever offset the write left behind.
    #[default]
    Keep,
    /// Seek back to offset 0 before reading. Fails on unseekable objects.
    Rewind,
}

/// What one verification observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Descriptor number used for the call; already closed.
    pub descriptor: RawFd,
    pub written: usize,
    pub read: usize,
    /// Exactly `read` bytes long.
    pub observed: Vec<u8>,
    /// `observed` equals the expected bytes cut to the read capacity.
    pub matches: bool,
    /// Offset right before the read, `None` for pipes and the like.
    pub offset_before_read: Option<u64>,
    /// Whether the final `close(2)` succeeded.
    pub closed: bool,
}

impl Verification {
    pub fn observed_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.observed)
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wrote {}B, read {}B {:?}, match: {}",
            self.written,
            self.read,
            self.observed_lossy(),
            self.matches
        )?;
        if let Some(off) = self.offset_before_read {
            write!(f, " (read at offset {off})")?;
        }
        Ok(())
    }
}

/// Write-then-read check over a single descriptor.
///
/// Holds only options, so one verifier can be reused for any number of paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundTripVerifier<'a> {
    reposition: Reposition,
    expected: Option<&'a [u8]>,
}

impl<'a> RoundTripVerifier<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reposition(mut self, reposition: Reposition) -> Self {
        self.reposition = reposition;
        self
    }

    /// Compare the read bytes against `expected` instead of the payload.
    pub fn expecting(mut self, expected: &'a [u8]) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Open `path` read-write, write `payload` once, read up to `read_capacity`
    /// bytes once, close.
    ///
    /// The path must already exist. Short writes and short reads are reported
    /// in the returned [`Verification`], not as errors.
    pub fn verify(
        &self,
        path: &Path,
        payload: &[u8],
        read_capacity: usize,
    ) -> Result<Verification, VerifyError> {
        let open_err = |source| VerifyError::Open {
            path: path.to_path_buf(),
            source,
        };
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| open_err(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        let mut fd = FileDescriptor::open(&c_path, OpenFlags::RDWR | OpenFlags::CLOEXEC)
            .map_err(open_err)?;
        let descriptor = fd.as_raw_fd();

        let written = fd.write(payload).map_err(|source| VerifyError::Write {
            len: payload.len(),
            source,
        })?;
        if written < payload.len() {
            warn!("short write on fd {descriptor}: {written} of {}", payload.len());
        }
        trace!("fd {descriptor}: wrote {written}B");

        let read_err = |source| VerifyError::Read {
            capacity: read_capacity,
            source,
        };
        if self.reposition == Reposition::Rewind {
            fd.seek(SeekFrom::Start(0)).map_err(read_err)?;
        }
        let offset_before_read = fd.position();

        let mut buffer: Vec<u8> = Vec::new();
        buffer.try_reserve_exact(read_capacity).map_err(|e| {
            read_err(io::Error::new(io::ErrorKind::OutOfMemory, e))
        })?;
        buffer.resize(read_capacity, 0);
        let read = fd.read(&mut buffer).map_err(read_err)?;
        buffer.truncate(read);
        trace!("fd {descriptor}: read {read}B at {offset_before_read:?}");

        let closed = match fd.close() {
            Ok(()) => true,
            Err(e) => {
                warn!("close fd {descriptor}: {e}");
                false
            }
        };

        let expected = self.expected.unwrap_or(payload);
        let matches = buffer[..] == expected[..expected.len().min(read_capacity)];
        let verification = Verification {
            descriptor,
            written,
            read,
            observed: buffer,
            matches,
            offset_before_read,
            closed,
        };
        debug!("{}: {verification}", path.display());
        Ok(verification)
    }
}

/// [`RoundTripVerifier::verify`] with default options: no repositioning, and the
/// payload is the expectation.
pub fn verify(
    path: impl AsRef<Path>,
    payload: &[u8],
    read_capacity: usize,
) -> Result<Verification, VerifyError> {
    RoundTripVerifier::new().verify(path.as_ref(), payload, read_capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stage;
    use std::fs;
    use std::io::Write;

    #[test]
    fn empty_file_reads_nothing_after_write() -> io::Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let v = verify(file.path(), b"test2", 5).unwrap();
        assert_eq!(v.written, 5);
        assert_eq!(v.read, 0);
        assert!(v.observed.is_empty());
        assert!(!v.matches);
        assert_eq!(v.offset_before_read, Some(5));
        assert!(v.closed);
        assert_eq!(fs::read(file.path())?, b"test2");
        Ok(())
    }

    #[test]
    fn missing_path_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo");
        let err = verify(&path, b"test2", 5).unwrap_err();
        assert_eq!(err.kind(), Stage::Open);
        assert_eq!(err.io_error().kind(), io::ErrorKind::NotFound);
        assert!(!path.exists());
    }

    #[test]
    fn empty_payload_zero_capacity() -> io::Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let v = verify(file.path(), b"", 0).unwrap();
        assert_eq!((v.written, v.read), (0, 0));
        assert!(v.matches);
        Ok(())
    }

    #[test]
    fn read_lands_after_written_region() -> io::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"Hello, world!")?;
        file.flush()?;

        let v = verify(file.path(), b"HELLO", 4).unwrap();
        assert_eq!(v.written, 5);
        assert_eq!(v.observed, b", wo");
        assert!(!v.matches);
        assert_eq!(fs::read(file.path())?, b"HELLO, world!");

        // same check, now told what to expect
        let v = RoundTripVerifier::new()
            .expecting(b", wo")
            .verify(file.path(), b"HELLO", 4)
            .unwrap();
        assert!(v.matches);
        Ok(())
    }

    #[test]
    fn rewind_reads_back_payload() -> io::Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let verifier = RoundTripVerifier::new().reposition(Reposition::Rewind);

        let v = verifier.verify(file.path(), b"test2", 5).unwrap();
        assert_eq!(v.observed, b"test2");
        assert_eq!(v.offset_before_read, Some(0));
        assert!(v.matches);

        // capacity below payload length compares the prefix
        let v = verifier.verify(file.path(), b"test2", 3).unwrap();
        assert_eq!(v.observed, b"tes");
        assert!(v.matches);
        Ok(())
    }

    #[test]
    fn rewind_random_payload() -> io::Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let verifier = RoundTripVerifier::new().reposition(Reposition::Rewind);
        for len in [1, 511, 4096, 4096 * 3 + 7] {
            let payload: Vec<u8> = (0..len).map(|_| rand::random::<u8>()).collect();
            let v = verifier.verify(file.path(), &payload, len * 2).unwrap();
            assert_eq!(v.written, len);
            assert_eq!(v.observed, payload);
            assert!(v.matches);
        }
        Ok(())
    }

    #[test]
    fn oversized_capacity_is_read_error() -> io::Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let err = verify(file.path(), b"x", usize::MAX).unwrap_err();
        assert_eq!(err.kind(), Stage::Read);
        assert_eq!(err.io_error().kind(), io::ErrorKind::OutOfMemory);
        // the write before it still landed
        assert_eq!(fs::read(file.path())?, b"x");
        Ok(())
    }

    #[test]
    fn path_with_nul_is_open_error() {
        let err = verify("bad\0path", b"x", 1).unwrap_err();
        assert_eq!(err.kind(), Stage::Open);
        assert_eq!(err.io_error().kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn directory_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify(dir.path(), b"x", 1).unwrap_err();
        assert_eq!(err.kind(), Stage::Open);
        assert_eq!(err.io_error().raw_os_error(), Some(libc::EISDIR));
    }

    #[test]
    fn dev_null_swallows_payload() {
        let v = verify("/dev/null", b"test2", 5).unwrap();
        assert_eq!((v.written, v.read), (5, 0));
        assert!(!v.matches);
    }

    #[test]
    fn dev_full_is_write_error() {
        let path = Path::new("/dev/full");
        if !path.exists() {
            return;
        }
        let err = verify(path, b"test2", 5).unwrap_err();
        assert_eq!(err.kind(), Stage::Write);
        assert_eq!(err.io_error().raw_os_error(), Some(libc::ENOSPC));
    }

    #[test]
    fn display_summary() -> io::Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let v = RoundTripVerifier::new()
            .reposition(Reposition::Rewind)
            .verify(file.path(), b"ab", 2)
            .unwrap();
        assert_eq!(
            v.to_string(),
            "wrote 2B, read 2B \"ab\", match: true (read at offset 0)"
        );
        Ok(())
    }
}
