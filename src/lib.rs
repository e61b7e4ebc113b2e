//! easylpac - command-line front-end for the lpac eUICC driver
//!
//! The driver does the SGP.22 work (APDUs to the card reader, HTTPS to the
//! SM-DP+). This crate only decides what to ask it, runs it, and turns what it
//! prints into typed results or readable errors.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Card identity and capabilities
//! easylpac chip info
//!
//! # Installed profiles, machine-readable
//! easylpac profile list --json
//!
//! # Download a profile from an activation code
//! easylpac profile download --activation-code 'LPA:1$rsp.example.com$MATCHING-ID'
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use easylpac::{CliArgs, Config, Lpac, LogSink, TracingNotifier};
//! use std::sync::Arc;
//!
//! let config = Config::discover(&CliArgs::default())?;
//! let log = LogSink::open_in(&config.log_dir())?;
//! let lpac = Lpac::new(config.driver_settings(), log, Arc::new(TracingNotifier));
//! for profile in lpac.profile_list()? {
//!     println!("{} {}", profile.iccid, profile.display_name());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Crates
//!
//! - `easylpac-runner`: argv-only process execution, output teeing, timeouts
//! - `easylpac-lpa`: the driver adapter (invocation, result parsing, error rendering)
//! - `easylpac-config`: configuration discovery and precedence

pub mod cli;
pub mod exit_codes;
pub mod logging;
pub mod report;

pub use easylpac_config::{CliArgs, Config, ConfigError, ConfigSource};
pub use easylpac_lpa::{
    ApduDriver, ConfirmPrompt, DriverSettings, ErrorKind, EuiccInfo, InstallNotification, Lpac,
    LpacError, Notification, NotificationMode, Profile, PullInfo, StatusNotifier, TracingNotifier,
    UserFriendlyError,
};
pub use easylpac_runner::LogSink;
pub use exit_codes::ExitCode;
