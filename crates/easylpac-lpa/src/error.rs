//! Error types for driver invocations
//!
//! [`LpacError`] separates the ways a call can fail so callers can branch on
//! [`LpacError::kind`]: the driver could not be run or the card reader failed,
//! the captured output could not be read, the driver reported a failure in its
//! result record, or a successful result did not have the expected shape.

use easylpac_runner::RunnerError;
use std::fmt;
use std::io;
use thiserror::Error;

/// A failure reported by the driver through a result record with a non-zero code.
///
/// `data` holds the already unwrapped and width-wrapped diagnostic text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LpaFailure {
    pub code: i64,
    pub function: String,
    pub data: String,
}

impl fmt::Display for LpaFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function: {}\nData: {}", self.function, self.data)
    }
}

impl std::error::Error for LpaFailure {}

#[derive(Error, Debug)]
pub enum LpacError {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("Failed to write driver log: {reason}")]
    LogSink { reason: String },

    /// The driver exited with a failure and stderr carried the smart-card marker.
    /// Displays stderr verbatim.
    #[error("{stderr}")]
    Smartcard { stderr: String },

    #[error("{0}")]
    Scan(io::Error),

    #[error("{0}")]
    Lpa(#[from] LpaFailure),

    #[error("Failed to decode {operation} result: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Driver produced no result for {operation}")]
    NoResult { operation: &'static str },
}

/// Coarse classification of [`LpacError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The process could not be run, its output could not be captured, it
    /// timed out, or the card reader subsystem failed.
    Transport,
    /// Reading the captured stdout failed.
    Scan,
    /// The driver returned a result record with a non-zero code.
    Application,
    /// A successful result did not decode into the expected type.
    Decode,
}

impl LpacError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Runner(_) | Self::LogSink { .. } | Self::Smartcard { .. } => ErrorKind::Transport,
            Self::Scan(_) => ErrorKind::Scan,
            Self::Lpa(_) => ErrorKind::Application,
            Self::Decode { .. } | Self::NoResult { .. } => ErrorKind::Decode,
        }
    }

    /// The driver-reported failure, if this is one.
    #[must_use]
    pub const fn as_lpa_failure(&self) -> Option<&LpaFailure> {
        match self {
            Self::Lpa(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    DriverExecution,
    CardReader,
    DriverReported,
    OutputDecoding,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DriverExecution => write!(f, "Driver Execution"),
            Self::CardReader => write!(f, "Card Reader"),
            Self::DriverReported => write!(f, "Driver Reported"),
            Self::OutputDecoding => write!(f, "Output Decoding"),
        }
    }
}

impl UserFriendlyError for LpacError {
    fn user_message(&self) -> String {
        match self {
            Self::Runner(RunnerError::SpawnFailed { program, reason }) => {
                format!("Could not start lpac at {program}: {reason}")
            }
            Self::Runner(RunnerError::Timeout { timeout_seconds }) => {
                format!("lpac did not finish within {timeout_seconds} seconds and was stopped")
            }
            Self::Runner(other) => format!("Running lpac failed: {other}"),
            Self::LogSink { reason } => format!("Could not write the lpac log: {reason}"),
            Self::Smartcard { stderr } => stderr.trim_end().to_string(),
            Self::Scan(e) => format!("Could not read lpac output: {e}"),
            Self::Lpa(failure) => failure.to_string(),
            Self::Decode { operation, source } => {
                format!("lpac returned an unexpected {operation} result: {source}")
            }
            Self::NoResult { operation } => {
                format!("lpac finished without reporting a {operation} result")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Runner(RunnerError::Timeout { .. }) => Some(
                "Every lpac invocation runs under a timeout so a stuck reader cannot hang the caller."
                    .to_string(),
            ),
            Self::Runner(_) => Some("lpac is launched from the configured lpac directory.".to_string()),
            Self::Smartcard { .. } => Some(
                "The PC/SC smart card subsystem rejected the request before lpac produced a result."
                    .to_string(),
            ),
            Self::Lpa(_) => Some("The eUICC or the SM-DP+ server refused the operation.".to_string()),
            Self::LogSink { .. } | Self::Scan(_) | Self::Decode { .. } | Self::NoResult { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Runner(RunnerError::SpawnFailed { .. }) => vec![
                "Check the lpac directory with --lpac-dir or [driver].dir in config.toml".to_string(),
                "Make sure the lpac executable exists and is executable".to_string(),
            ],
            Self::Runner(RunnerError::Timeout { .. }) => vec![
                "Re-seat the card reader and try again".to_string(),
                "Raise the limit with --timeout or [driver].timeout_secs".to_string(),
            ],
            Self::Smartcard { .. } => vec![
                "Make sure a card reader is connected and the eUICC is inserted".to_string(),
                "Check that the PC/SC service (pcscd) is running".to_string(),
                "Pick another reader with --interface (see `easylpac driver list`)".to_string(),
            ],
            Self::Lpa(_) => vec![
                "Enable --debug-http or --debug-apdu and inspect the lpac log".to_string(),
            ],
            Self::Decode { .. } | Self::NoResult { .. } => vec![
                "Check that the installed lpac version is supported (`easylpac version`)".to_string(),
            ],
            Self::Runner(_) | Self::LogSink { .. } | Self::Scan(_) => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Smartcard { .. } => ErrorCategory::CardReader,
            Self::Lpa(_) => ErrorCategory::DriverReported,
            Self::Decode { .. } | Self::NoResult { .. } => ErrorCategory::OutputDecoding,
            Self::Runner(_) | Self::LogSink { .. } | Self::Scan(_) => ErrorCategory::DriverExecution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lpa_failure_display_format() {
        let failure = LpaFailure {
            code: -1,
            function: "es10b_load_bound_profile_package".to_string(),
            data: "profile already exists".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "Function: es10b_load_bound_profile_package\nData: profile already exists"
        );
    }

    #[test]
    fn test_smartcard_error_displays_stderr_verbatim() {
        let err = LpacError::Smartcard {
            stderr: "SCardListReaders() failed: 8010002E\n".to_string(),
        };
        assert_eq!(err.to_string(), "SCardListReaders() failed: 8010002E\n");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.category(), ErrorCategory::CardReader);
    }

    #[test]
    fn test_kinds_are_distinguishable() {
        let lpa = LpacError::from(LpaFailure {
            code: 1,
            function: "f".to_string(),
            data: String::new(),
        });
        assert_eq!(lpa.kind(), ErrorKind::Application);
        assert!(lpa.as_lpa_failure().is_some());

        let scan = LpacError::Scan(io::Error::other("broken pipe"));
        assert_eq!(scan.kind(), ErrorKind::Scan);
        assert!(scan.as_lpa_failure().is_none());

        let timeout = LpacError::from(RunnerError::Timeout { timeout_seconds: 5 });
        assert_eq!(timeout.kind(), ErrorKind::Transport);

        let missing = LpacError::NoResult { operation: "profile list" };
        assert_eq!(missing.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_every_error_has_a_user_message() {
        let errors = vec![
            LpacError::from(RunnerError::SpawnFailed {
                program: "/opt/lpac/lpac".to_string(),
                reason: "No such file or directory".to_string(),
            }),
            LpacError::LogSink {
                reason: "read-only file system".to_string(),
            },
            LpacError::NoResult { operation: "chip info" },
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }
}
