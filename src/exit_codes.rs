//! Exit codes of the easylpac binary
//!
//! | Exit Code | Name | Description |
//! |-----------|------|-------------|
//! | 0 | SUCCESS | Completed successfully |
//! | 1 | INTERNAL | General failure |
//! | 2 | CLI_ARGS | Invalid arguments or configuration |
//! | 3 | TRANSPORT | lpac could not be run, timed out, or the card reader failed |
//! | 4 | DRIVER_REPORTED | lpac reported a failure in its result |
//! | 5 | DECODE | lpac succeeded but its result had an unexpected shape |

use easylpac_lpa::{ErrorKind, LpacError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const INTERNAL: ExitCode = ExitCode(1);
    pub const CLI_ARGS: ExitCode = ExitCode(2);
    pub const TRANSPORT: ExitCode = ExitCode(3);
    pub const DRIVER_REPORTED: ExitCode = ExitCode(4);
    pub const DECODE: ExitCode = ExitCode(5);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl From<ErrorKind> for ExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Transport | ErrorKind::Scan => Self::TRANSPORT,
            ErrorKind::Application => Self::DRIVER_REPORTED,
            ErrorKind::Decode => Self::DECODE,
        }
    }
}

impl From<&LpacError> for ExitCode {
    fn from(err: &LpacError) -> Self {
        err.kind().into()
    }
}
