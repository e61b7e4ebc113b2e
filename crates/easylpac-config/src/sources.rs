use std::collections::BTreeMap;
use std::fmt;

use super::Config;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Command-line flag (highest precedence).
    Cli,
    /// Configuration file.
    Config,
    /// Built-in default (lowest precedence).
    Default,
}

impl ConfigSource {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Config => "config",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Config {
    fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }

    /// Effective configuration as `key -> (value, source)`, sorted by key.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let settings = self.driver_settings();
        let entries = [
            ("driver_dir", settings.dir.display().to_string()),
            ("executable", settings.executable),
            ("interface", settings.interface),
            ("debug_http", settings.debug_http.to_string()),
            ("debug_apdu", settings.debug_apdu.to_string()),
            ("timeout_secs", settings.timeout.as_secs().to_string()),
            ("auto_process", self.auto_process_notifications().to_string()),
            ("log_dir", self.log_dir().display().to_string()),
        ];

        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), (value, self.source_of(key))))
            .collect()
    }
}
