//! Command-line interface for easylpac
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `run`: Main entry point and command dispatch
//! - `commands`: Command implementations and output formatting

pub mod args;
mod commands;
mod run;

pub use args::{Cli, Commands};
pub use run::run;
