//! One driver invocation, end to end
//!
//! [`Lpac::run`] is the single entry point every operation goes through:
//!
//! 1. take the invocation lock (one driver process at a time per client),
//! 2. publish busy/locked through the [`StatusNotifier`],
//! 3. append the command line to the transcript log,
//! 4. run the driver with a fully replaced environment and the driver directory
//!    as working directory,
//! 5. fail fast on a card-reader error, otherwise scan stdout for the result.

use easylpac_runner::{CommandSpec, LogSink, NativeRunner, ProcessOutput, ProcessRunner};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::LpacError;
use crate::notifier::{BusyGuard, StatusNotifier};
use crate::stream::parse_result;

/// Substring of stderr that identifies a PC/SC (smart card subsystem) failure.
pub const SMARTCARD_MARKER: &str = "SCard";

#[cfg(windows)]
pub const DEFAULT_EXECUTABLE: &str = "lpac.exe";
#[cfg(not(windows))]
pub const DEFAULT_EXECUTABLE: &str = "lpac";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Where the driver lives and how it is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSettings {
    /// Directory holding the driver; also its working directory.
    pub dir: PathBuf,
    /// File name of the driver inside `dir`.
    pub executable: String,
    /// Reader selection passed as `DRIVER_IFID`. Empty selects the driver default.
    pub interface: String,
    pub debug_http: bool,
    pub debug_apdu: bool,
    pub timeout: Duration,
}

impl DriverSettings {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            executable: DEFAULT_EXECUTABLE.to_string(),
            interface: String::new(),
            debug_http: false,
            debug_apdu: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn executable_path(&self) -> PathBuf {
        self.dir.join(&self.executable)
    }

    /// The complete environment of the driver process.
    ///
    /// Nothing from the parent environment is inherited. The debug switches are
    /// only present when enabled.
    #[must_use]
    pub fn environment(&self) -> Vec<(&'static str, String)> {
        let mut env = vec![
            ("LPAC_APDU", "pcsc".to_string()),
            ("LPAC_HTTP", "curl".to_string()),
            ("DRIVER_IFID", self.interface.clone()),
        ];
        if self.debug_http {
            env.push(("LIBEUICC_DEBUG_HTTP", "1".to_string()));
        }
        if self.debug_apdu {
            env.push(("LIBEUICC_DEBUG_APDU", "1".to_string()));
        }
        env
    }

    /// Build the argv-only command for `args`.
    ///
    /// On Windows `SYSTEMROOT` is carried over from the parent as well; the
    /// system DLL loader and Winsock do not work without it.
    #[must_use]
    pub fn command_spec<S: AsRef<str>>(&self, args: &[S]) -> CommandSpec {
        let cmd = CommandSpec::new(self.executable_path())
            .args(args.iter().map(|arg| AsRef::<str>::as_ref(arg)))
            .cwd(&self.dir)
            .env_clear()
            .envs(self.environment());

        #[cfg(windows)]
        let cmd = match std::env::var_os("SYSTEMROOT") {
            Some(root) => cmd.env("SYSTEMROOT", root),
            None => cmd,
        };

        cmd
    }
}

/// Client for the driver executable.
///
/// Invocations are serialized: the card reader is exclusive hardware, so a
/// second call from another thread waits until the first one has finished.
pub struct Lpac {
    settings: DriverSettings,
    runner: Box<dyn ProcessRunner + Send + Sync>,
    log: LogSink,
    notifier: Arc<dyn StatusNotifier>,
    exclusive: Mutex<()>,
}

impl Lpac {
    /// Client running the real driver, teeing its output into `log`.
    #[must_use]
    pub fn new(settings: DriverSettings, log: LogSink, notifier: Arc<dyn StatusNotifier>) -> Self {
        let runner = NativeRunner::with_log(log.clone());
        Self::with_runner(settings, Box::new(runner), log, notifier)
    }

    #[must_use]
    pub fn with_runner(
        settings: DriverSettings,
        runner: Box<dyn ProcessRunner + Send + Sync>,
        log: LogSink,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Self {
        Self {
            settings,
            runner,
            log,
            notifier,
            exclusive: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Transcript file, when logging to disk.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log.path()
    }

    /// Run the driver with `args` and return the `data` of its result record.
    ///
    /// `Ok(None)` means the driver printed no result record at all.
    pub fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<Option<Value>, LpacError> {
        // Guards the reader only; a poisoned lock has no state to repair.
        let _exclusive = self.exclusive.lock().unwrap_or_else(PoisonError::into_inner);
        let _busy = BusyGuard::new(self.notifier.as_ref());

        let cmd = self.settings.command_spec(args);
        let line = cmd.display_line();
        self.log
            .write_line(&line)
            .map_err(|e| LpacError::LogSink {
                reason: e.to_string(),
            })?;

        debug!(command = %line, "Invoking lpac");
        let output = self.runner.run(&cmd, self.settings.timeout)?;
        if let Err(e) = self.log.flush() {
            warn!(error = %e, "Failed to flush lpac log");
        }

        classify(output)
    }
}

/// Turn captured output into the invocation outcome.
///
/// A failed exit with the smart-card marker on stderr short-circuits without
/// looking at stdout. Any other exit status, including a failed one, has its
/// stdout scanned.
fn classify(output: ProcessOutput) -> Result<Option<Value>, LpacError> {
    if !output.success() {
        let stderr = output.stderr_string();
        if !stderr.trim().is_empty() && stderr.contains(SMARTCARD_MARKER) {
            warn!(exit_code = ?output.exit_code, "lpac reported a smart card failure");
            return Err(LpacError::Smartcard { stderr });
        }
        debug!(exit_code = ?output.exit_code, "lpac exited with failure, scanning stdout");
    }
    parse_result(output.stdout.as_slice())
}
