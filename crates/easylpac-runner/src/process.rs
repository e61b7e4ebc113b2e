use crate::error::RunnerError;
use std::time::Duration;

use super::CommandSpec;

/// Captured result of one process execution.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Standard output from the process
    pub stdout: Vec<u8>,
    /// Standard error from the process
    pub stderr: Vec<u8>,
    /// Exit code from the process (None if terminated by signal)
    pub exit_code: Option<i32>,
    /// Whether the execution timed out
    pub timed_out: bool,
}

impl ProcessOutput {
    /// Create a new `ProcessOutput` with the given values.
    #[must_use]
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: Option<i32>, timed_out: bool) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            timed_out,
        }
    }

    /// Get stdout as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Check if the process exited successfully (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }
}

/// Trait for process execution.
///
/// Implementations MUST use argv-style APIs only (no shell string evaluation).
/// The interface is synchronous: the calling thread blocks until the child
/// exits, the timeout fires, or supervision fails.
pub trait ProcessRunner {
    /// Execute a command with the given timeout.
    ///
    /// # Returns
    ///
    /// * `Ok(ProcessOutput)` - The process completed (possibly with non-zero exit code)
    /// * `Err(RunnerError::Timeout)` - The process timed out and was killed
    /// * `Err(RunnerError::*)` - Spawn, capture or log failures
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_output_success() {
        let success = ProcessOutput::new(Vec::new(), Vec::new(), Some(0), false);
        assert!(success.success());

        let failure = ProcessOutput::new(Vec::new(), Vec::new(), Some(255), false);
        assert!(!failure.success());

        let timeout = ProcessOutput::new(Vec::new(), Vec::new(), Some(0), true);
        assert!(!timeout.success());

        // Killed by signal
        let killed = ProcessOutput::new(Vec::new(), Vec::new(), None, false);
        assert!(!killed.success());
    }

    #[test]
    fn test_process_output_lossy_utf8() {
        let invalid_utf8 = vec![0xff, 0xfe, b'o', b'k'];
        let output = ProcessOutput::new(invalid_utf8.clone(), invalid_utf8, Some(0), false);
        assert!(output.stdout_string().ends_with("ok"));
        assert!(output.stderr_string().ends_with("ok"));
    }

    struct CannedRunner {
        output: ProcessOutput,
    }

    impl ProcessRunner for CannedRunner {
        fn run(&self, _cmd: &CommandSpec, _timeout: Duration) -> Result<ProcessOutput, RunnerError> {
            Ok(self.output.clone())
        }
    }

    #[test]
    fn test_process_runner_trait_object() {
        let runner: Box<dyn ProcessRunner> = Box::new(CannedRunner {
            output: ProcessOutput::new(b"{}".to_vec(), Vec::new(), Some(0), false),
        });

        let output = runner
            .run(&CommandSpec::new("lpac").arg("version"), Duration::from_secs(5))
            .unwrap();
        assert_eq!(output.stdout_string(), "{}");
        assert!(output.success());
    }
}
