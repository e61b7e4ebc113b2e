use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
}
