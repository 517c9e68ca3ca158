//! Constants used by fdprobe

/// Payload written when none is given, same as the original smoke test.
pub const DEFAULT_PAYLOAD: &str = "test2";
/// Bytes read back when no length is given.
pub const DEFAULT_READ_LEN: usize = 5;

/// Environment variable selecting the log level.
pub const LOG_ENV: &str = "LOG";

/// Exit code when a verification fails at open, write or read.
pub const EXIT_VERIFY_FAILED: i32 = 1;
/// Exit code for bad command-line arguments.
pub const EXIT_USAGE: i32 = 2;
