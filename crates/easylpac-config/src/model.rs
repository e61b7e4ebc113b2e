use easylpac_lpa::{DEFAULT_EXECUTABLE, DriverSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::sources::ConfigSource;

pub const DEFAULT_TIMEOUT_SECS: u64 = 600;
pub const MIN_TIMEOUT_SECS: u64 = 5;
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Name of the log directory created under the system temp dir.
pub const LOG_DIR_NAME: &str = "EasyLPAC-log";

/// `[driver]` section: where lpac lives and how it is started.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    pub dir: Option<PathBuf>,
    pub executable: Option<String>,
    /// Value of `DRIVER_IFID`; see `easylpac driver list`.
    pub interface: Option<String>,
    pub debug_http: Option<bool>,
    pub debug_apdu: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            dir: Some(default_driver_dir()),
            executable: Some(DEFAULT_EXECUTABLE.to_string()),
            interface: Some(String::new()),
            debug_http: Some(false),
            debug_apdu: Some(false),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// `[notifications]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Send and remove the install notification right after a download.
    pub auto_process: Option<bool>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            auto_process: Some(true),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Directory receiving the lpac transcript files.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: Some(env::temp_dir().join(LOG_DIR_NAME)),
        }
    }
}

/// Driver directory next to the running executable, or `./lpac` when the
/// executable path is unknown.
fn default_driver_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("lpac")))
        .unwrap_or_else(|| PathBuf::from("lpac"))
}

/// Resolved configuration.
///
/// After discovery every `Option` field holds a value; the accessors fall back
/// to the built-in default only for configs built by hand.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub driver: DriverConfig,
    pub notifications: NotificationsConfig,
    pub logging: LoggingConfig,
    /// File the values were read from, if any.
    pub config_path: Option<PathBuf>,
    pub source_attribution: HashMap<String, ConfigSource>,
}

impl Config {
    #[must_use]
    pub fn driver_dir(&self) -> PathBuf {
        self.driver.dir.clone().unwrap_or_else(default_driver_dir)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.driver.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    #[must_use]
    pub fn auto_process_notifications(&self) -> bool {
        self.notifications.auto_process.unwrap_or(true)
    }

    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .dir
            .clone()
            .unwrap_or_else(|| env::temp_dir().join(LOG_DIR_NAME))
    }

    /// Settings for [`easylpac_lpa::Lpac`].
    #[must_use]
    pub fn driver_settings(&self) -> DriverSettings {
        let mut settings = DriverSettings::new(self.driver_dir());
        if let Some(executable) = &self.driver.executable {
            settings.executable.clone_from(executable);
        }
        if let Some(interface) = &self.driver.interface {
            settings.interface.clone_from(interface);
        }
        settings.debug_http = self.driver.debug_http.unwrap_or(false);
        settings.debug_apdu = self.driver.debug_apdu.unwrap_or(false);
        settings.timeout = self.timeout();
        settings
    }
}
