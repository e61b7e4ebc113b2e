//! Configuration management for easylpac
//!
//! Hierarchical configuration with discovery and precedence: CLI > file >
//! defaults. The TOML file has `[driver]`, `[notifications]` and `[logging]`
//! sections; every resolved value remembers where it came from.

mod cli_args;
mod discovery;
mod error;
mod model;
mod sources;
mod validation;

pub use cli_args::CliArgs;
pub use error::ConfigError;
pub use model::*;
pub use sources::ConfigSource;
