use crate::error::ConfigError;

use super::{Config, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};

fn invalid(key: &str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    }
}

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.driver.timeout_secs {
            if timeout < MIN_TIMEOUT_SECS {
                return Err(invalid(
                    "timeout_secs",
                    format!("must be at least {MIN_TIMEOUT_SECS} seconds"),
                ));
            }
            if timeout > MAX_TIMEOUT_SECS {
                return Err(invalid(
                    "timeout_secs",
                    format!("exceeds maximum limit of {MAX_TIMEOUT_SECS} seconds (1 hour)"),
                ));
            }
        }

        if let Some(executable) = &self.driver.executable {
            if executable.trim().is_empty() {
                return Err(invalid("executable", "must not be empty"));
            }
            if executable.contains(['/', '\\']) || executable == "." || executable == ".." {
                return Err(invalid(
                    "executable",
                    format!("'{executable}' must be a file name inside the driver directory"),
                ));
            }
        }

        if let Some(dir) = &self.driver.dir
            && dir.as_os_str().is_empty()
        {
            return Err(invalid("driver_dir", "must not be empty"));
        }

        if let Some(dir) = &self.logging.dir
            && dir.as_os_str().is_empty()
        {
            return Err(invalid("log_dir", "must not be empty"));
        }

        Ok(())
    }
}
