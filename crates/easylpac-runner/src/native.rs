use crate::error::RunnerError;
use crate::log_sink::LogSink;
use std::io::{ErrorKind, Read};
use std::process::Stdio;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

use super::{CommandSpec, ProcessOutput, ProcessRunner};

const PUMP_CHUNK_BYTES: usize = 8192;

// ============================================================================
// NativeRunner - argv-only execution with teeing and timeout
// ============================================================================

/// Native process runner using `std::process::Command`.
///
/// Each pipe is drained by its own thread which appends every chunk to an
/// in-memory buffer and to the runner's [`LogSink`] as it arrives. The exit
/// status is collected by a third thread; the calling thread only waits on a
/// channel with `recv_timeout`, and kills the child when the deadline passes.
///
/// # Example
///
/// ```rust,no_run
/// use easylpac_runner::{CommandSpec, LogSink, NativeRunner, ProcessRunner};
/// use std::time::Duration;
///
/// let runner = NativeRunner::with_log(LogSink::discard());
/// let cmd = CommandSpec::new("/opt/lpac/lpac").arg("version");
/// let output = runner.run(&cmd, Duration::from_secs(30)).unwrap();
/// println!("{}", output.stdout_string());
/// ```
#[derive(Debug, Clone, Default)]
pub struct NativeRunner {
    log: LogSink,
}

impl NativeRunner {
    /// Runner whose output is captured but not logged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that tees stdout and stderr into `log`.
    #[must_use]
    pub fn with_log(log: LogSink) -> Self {
        Self { log }
    }
}

impl ProcessRunner for NativeRunner {
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        let program = cmd.program.to_string_lossy().into_owned();

        let mut command = cmd.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(
            program = %program,
            args = ?cmd.args,
            cwd = ?cmd.cwd,
            clear_env = cmd.clear_env,
            "Spawning process"
        );

        let mut child = command.spawn().map_err(|e| RunnerError::SpawnFailed {
            program: program.clone(),
            reason: e.to_string(),
        })?;

        let stdout = child.stdout.take().ok_or_else(|| pipe_missing("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| pipe_missing("stderr"))?;

        let stdout_pump = spawn_pump(stdout, "stdout", self.log.clone());
        let stderr_pump = spawn_pump(stderr, "stderr", self.log.clone());

        let child_id = child.id();
        let (tx, rx) = mpsc::channel();
        let waiter = thread::spawn(move || {
            let _ = tx.send(child.wait());
        });

        let status = match rx.recv_timeout(timeout) {
            Ok(wait_result) => {
                let _ = waiter.join();
                wait_result.map_err(|e| RunnerError::CaptureFailed {
                    stream: "exit status",
                    reason: e.to_string(),
                })?
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(
                    program = %program,
                    timeout_seconds = timeout.as_secs(),
                    "Process exceeded timeout, terminating"
                );
                Self::terminate_process(child_id);
                let _ = waiter.join();
                // Pump threads are left to finish on their own: a grandchild may
                // still hold the pipes open.
                return Err(RunnerError::Timeout {
                    timeout_seconds: timeout.as_secs(),
                });
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => return Err(RunnerError::MonitorLost),
        };

        let stdout = join_pump(stdout_pump)?;
        let stderr = join_pump(stderr_pump)?;

        debug!(
            program = %program,
            exit_code = ?status.code(),
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "Process exited"
        );

        Ok(ProcessOutput::new(stdout, stderr, status.code(), false))
    }
}

impl NativeRunner {
    /// Terminate a process by its PID.
    ///
    /// On Unix, sends SIGKILL to the process.
    /// On Windows, uses TerminateProcess.
    fn terminate_process(pid: u32) {
        #[cfg(unix)]
        {
            if let Ok(pid) = libc::pid_t::try_from(pid) {
                // SAFETY: kill(2) has no memory-safety preconditions; a stale pid
                // only yields ESRCH.
                unsafe {
                    libc::kill(pid, libc::SIGKILL);
                }
            }
        }

        #[cfg(windows)]
        {
            use windows::Win32::Foundation::CloseHandle;
            use windows::Win32::System::Threading::{
                OpenProcess, PROCESS_TERMINATE, TerminateProcess,
            };

            unsafe {
                if let Ok(handle) = OpenProcess(PROCESS_TERMINATE, false, pid) {
                    let _ = TerminateProcess(handle, 1);
                    let _ = CloseHandle(handle);
                }
            }
        }

        #[cfg(not(any(unix, windows)))]
        {
            let _ = pid;
        }
    }
}

/// Copy `reader` to completion into memory and the log sink.
///
/// A failing sink does not stop the copy and does not fail the run: the child
/// would otherwise block on a full pipe, and the captured bytes are still the
/// outcome of the invocation. The first sink error is logged once the stream ends.
fn spawn_pump<R>(
    mut reader: R,
    stream: &'static str,
    log: LogSink,
) -> JoinHandle<Result<Vec<u8>, RunnerError>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut captured = Vec::new();
        let mut sink_error = None;
        let mut chunk = [0u8; PUMP_CHUNK_BYTES];

        loop {
            match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    captured.extend_from_slice(&chunk[..n]);
                    if sink_error.is_none()
                        && let Err(e) = log.write_bytes(&chunk[..n])
                    {
                        sink_error = Some(e);
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(RunnerError::CaptureFailed {
                        stream,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Some(e) = sink_error {
            warn!(stream, error = %e, "Failed to tee process output into log");
        }
        Ok(captured)
    })
}

fn pipe_missing(stream: &'static str) -> RunnerError {
    RunnerError::CaptureFailed {
        stream,
        reason: "pipe was not opened".to_string(),
    }
}

fn join_pump(handle: JoinHandle<Result<Vec<u8>, RunnerError>>) -> Result<Vec<u8>, RunnerError> {
    handle.join().map_err(|_| RunnerError::MonitorLost)?
}
