//! Error types for the runner crate

use thiserror::Error;

/// Failures while launching or supervising a child process.
///
/// A non-zero exit status is NOT an error at this layer; it is reported through
/// [`ProcessOutput::exit_code`](crate::ProcessOutput::exit_code).
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Failed to capture {stream}: {reason}")]
    CaptureFailed { stream: &'static str, reason: String },

    #[error("Execution timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    #[error("Process monitoring thread terminated unexpectedly")]
    MonitorLost,
}
