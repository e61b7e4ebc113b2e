use std::path::PathBuf;

/// Overrides taken from the command line. `None` leaves the value to the
/// config file or the built-in default.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub lpac_dir: Option<PathBuf>,
    pub executable: Option<String>,
    pub interface: Option<String>,
    pub debug_http: Option<bool>,
    pub debug_apdu: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub auto_process: Option<bool>,
    pub log_dir: Option<PathBuf>,
}
