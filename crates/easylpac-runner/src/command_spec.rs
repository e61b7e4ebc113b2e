use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

// ============================================================================
// CommandSpec - argv-only process specification
// ============================================================================

/// Specification for a command to execute.
///
/// All process execution goes through this type to ensure argv-style invocation.
/// Arguments are stored as discrete `OsString` elements and are handed to the
/// operating system as such; no `sh -c` or `cmd /C` evaluation ever happens.
///
/// # Environment
///
/// By default the child inherits the parent environment plus any overrides set
/// with [`env`](Self::env). Calling [`env_clear`](Self::env_clear) switches to a
/// fully replaced environment: the child sees only the variables recorded here.
///
/// # Example
///
/// ```rust
/// use easylpac_runner::CommandSpec;
/// use std::ffi::OsString;
///
/// let cmd = CommandSpec::new("/opt/lpac/lpac")
///     .args(["profile", "list"])
///     .cwd("/opt/lpac")
///     .env_clear()
///     .env("LPAC_APDU", "pcsc");
///
/// assert_eq!(cmd.program, OsString::from("/opt/lpac/lpac"));
/// assert_eq!(cmd.args.len(), 2);
/// assert!(cmd.clear_env);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as discrete elements (NOT shell strings)
    pub args: Vec<OsString>,
    /// Optional working directory
    pub cwd: Option<PathBuf>,
    /// Optional environment overrides
    pub env: Option<HashMap<OsString, OsString>>,
    /// When set, the parent environment is not inherited
    pub clear_env: bool,
}

impl CommandSpec {
    /// Create a new `CommandSpec` with the given program.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Add a single argument to the command.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments to the command.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the command.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set an environment variable for the command.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set multiple environment variables for the command.
    #[must_use]
    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let env_map = self.env.get_or_insert_with(HashMap::new);
        for (key, value) in envs {
            env_map.insert(key.into(), value.into());
        }
        self
    }

    /// Do not inherit the parent environment.
    #[must_use]
    pub fn env_clear(mut self) -> Self {
        self.clear_env = true;
        self
    }

    /// Render the command as a single space-joined line.
    ///
    /// For logging only. The result is not quoted and must never be handed to a
    /// shell.
    #[must_use]
    pub fn display_line(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Convert this `CommandSpec` into a `std::process::Command`.
    ///
    /// On Windows the child is created without a console window so that a GUI
    /// or tray front-end does not flash a terminal for every driver call.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if self.clear_env {
            cmd.env_clear();
        }

        if let Some(ref env) = self.env {
            cmd.envs(env);
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            use windows::Win32::System::Threading::CREATE_NO_WINDOW;
            cmd.creation_flags(CREATE_NO_WINDOW.0);
        }

        cmd
    }
}
