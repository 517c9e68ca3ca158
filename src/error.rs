use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The descriptor operation a verification failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Open,
    Write,
    Read,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Open => "open",
            Stage::Write => "write",
            Stage::Read => "read",
        })
    }
}

/// A failed verification. Nothing is retried; the caller decides what to do.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("cannot open {} for read-write", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write of {len} bytes failed")]
    Write {
        len: usize,
        #[source]
        source: io::Error,
    },
    #[error("read of up to {capacity} bytes failed")]
    Read {
        capacity: usize,
        #[source]
        source: io::Error,
    },
}

impl VerifyError {
    pub fn kind(&self) -> Stage {
        match self {
            VerifyError::Open { .. } => Stage::Open,
            VerifyError::Write { .. } => Stage::Write,
            VerifyError::Read { .. } => Stage::Read,
        }
    }

    /// The OS error behind this failure.
    pub fn io_error(&self) -> &io::Error {
        match self {
            VerifyError::Open { source, .. }
            | VerifyError::Write { source, .. }
            | VerifyError::Read { source, .. } => source,
        }
    }
}
