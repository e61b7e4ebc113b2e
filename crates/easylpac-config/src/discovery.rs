use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use super::{CliArgs, Config, ConfigSource, DriverConfig, LoggingConfig, NotificationsConfig};

/// Environment variable naming a directory that holds `config.toml`.
pub const HOME_ENV: &str = "EASYLPAC_HOME";

const CONFIG_DIR_NAME: &str = ".easylpac";
const CONFIG_FILE_NAME: &str = "config.toml";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    driver: Option<DriverConfig>,
    notifications: Option<NotificationsConfig>,
    logging: Option<LoggingConfig>,
}

/// Copy every `Some` field of `$from` into `$into`, recording `$source` under
/// the field's key.
macro_rules! overlay {
    ($attr:ident, $source:expr, $( $into:expr => $from:expr, $key:literal; )+) => {
        $(
            if let Some(value) = $from {
                $into = Some(value);
                $attr.insert($key.to_string(), $source);
            }
        )+
    };
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory as the start of the upward search.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover configuration starting from a specific directory.
    ///
    /// The file is, in order: `--config`, `$EASYLPAC_HOME/config.toml`, the
    /// nearest `.easylpac/config.toml` at or above `start_dir`, then
    /// `<platform config dir>/easylpac/config.toml`. Without any of them only
    /// CLI values and defaults apply.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let config_path = match &cli_args.config_path {
            Some(explicit) => Some(explicit.clone()),
            None => Self::locate_config_file(start_dir)?,
        };
        Self::load(config_path.as_deref(), cli_args)
    }

    /// Resolve configuration from a known file (or none) plus CLI overrides.
    ///
    /// Does not look at the environment or the filesystem beyond `config_path`.
    pub fn load(config_path: Option<&Path>, cli_args: &CliArgs) -> Result<Self> {
        let mut driver = DriverConfig::default();
        let mut notifications = NotificationsConfig::default();
        let mut logging = LoggingConfig::default();
        let mut source_attribution = HashMap::new();

        if let Some(path) = config_path {
            let file = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            let source = ConfigSource::Config;

            if let Some(file_driver) = file.driver {
                overlay!(source_attribution, source,
                    driver.dir => file_driver.dir, "driver_dir";
                    driver.executable => file_driver.executable, "executable";
                    driver.interface => file_driver.interface, "interface";
                    driver.debug_http => file_driver.debug_http, "debug_http";
                    driver.debug_apdu => file_driver.debug_apdu, "debug_apdu";
                    driver.timeout_secs => file_driver.timeout_secs, "timeout_secs";
                );
            }
            if let Some(file_notifications) = file.notifications {
                overlay!(source_attribution, source,
                    notifications.auto_process => file_notifications.auto_process, "auto_process";
                );
            }
            if let Some(file_logging) = file.logging {
                overlay!(source_attribution, source,
                    logging.dir => file_logging.dir, "log_dir";
                );
            }
        }

        overlay!(source_attribution, ConfigSource::Cli,
            driver.dir => cli_args.lpac_dir.clone(), "driver_dir";
            driver.executable => cli_args.executable.clone(), "executable";
            driver.interface => cli_args.interface.clone(), "interface";
            driver.debug_http => cli_args.debug_http, "debug_http";
            driver.debug_apdu => cli_args.debug_apdu, "debug_apdu";
            driver.timeout_secs => cli_args.timeout_secs, "timeout_secs";
            notifications.auto_process => cli_args.auto_process, "auto_process";
            logging.dir => cli_args.log_dir.clone(), "log_dir";
        );

        let config = Self {
            driver,
            notifications,
            logging,
            config_path: config_path.map(Path::to_path_buf),
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Find the config file to use when none was given explicitly.
    pub fn locate_config_file(start_dir: &Path) -> Result<Option<PathBuf>> {
        if let Some(home) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return Ok(Some(PathBuf::from(home).join(CONFIG_FILE_NAME)));
        }
        if let Some(found) = Self::discover_config_file_from(start_dir)? {
            return Ok(Some(found));
        }
        Ok(dirs::config_dir()
            .map(|dir| dir.join("easylpac").join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file()))
    }

    /// Search upward from `start_dir` for `.easylpac/config.toml`.
    ///
    /// Stops at repository root markers (.git, .hg, .svn) or the filesystem root.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        for dir in start_dir.ancestors() {
            let config_path = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Ok(Some(config_path));
            }

            if [".git", ".hg", ".svn"]
                .iter()
                .any(|marker| dir.join(marker).exists())
            {
                break;
            }
        }

        Ok(None)
    }

    /// Load configuration from TOML file. A missing file counts as empty.
    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config file: {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )),
        }
    }
}
