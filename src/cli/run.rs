//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Opens the lpac transcript log and builds the client
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;
use easylpac_config::{CliArgs, Config};
use easylpac_lpa::{Lpac, LpacError, TracingNotifier};
use easylpac_runner::LogSink;
use std::sync::Arc;
use tracing::{debug, warn};

use super::args::{Cli, Commands, ProfileCommands};
use super::commands::{self, Output};
use crate::exit_codes::ExitCode;
use crate::logging::init_tracing;
use crate::report::display_for_user;

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On error: prints the error report to stderr, returns `Err(ExitCode)`
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Warning: failed to initialise logging: {e}");
    }

    let cli_args = cli_args(&cli);
    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            eprintln!("\nSuggestions:");
            eprintln!("  • Check the values passed on the command line");
            eprintln!("  • Run `easylpac config --config <file>` to inspect a config file");
            return Err(ExitCode::CLI_ARGS);
        }
    };
    debug!(config_path = ?config.config_path, "Configuration loaded");

    let out = Output { json: cli.json };

    // Inspecting the configuration must work even when lpac is missing.
    if matches!(cli.command, Commands::Config) {
        return commands::execute_config(&config, out).map_err(|e| report(&e));
    }

    let log = match LogSink::open_in(&config.log_dir()) {
        Ok(log) => log,
        Err(e) => {
            eprintln!(
                "Error: could not create the lpac log in {}: {e}",
                config.log_dir().display()
            );
            eprintln!("\nSuggestions:");
            eprintln!("  • Pick a writable directory with --log-dir or [logging].dir");
            return Err(ExitCode::INTERNAL);
        }
    };
    if let Some(path) = log.path() {
        debug!(log = %path.display(), "Writing lpac transcript");
    }

    let lpac = Lpac::new(config.driver_settings(), log, Arc::new(TracingNotifier));
    commands::execute(cli.command, &lpac, &config, out).map_err(|e| report(&e))
}

/// Map the CLI flags onto configuration overrides.
fn cli_args(cli: &Cli) -> CliArgs {
    let manual_download = matches!(
        &cli.command,
        Commands::Profile(ProfileCommands::Download(args)) if args.manual
    );

    CliArgs {
        config_path: cli.config.clone(),
        lpac_dir: cli.lpac_dir.clone(),
        executable: cli.executable.clone(),
        interface: cli.interface.clone(),
        debug_http: cli.debug_http.then_some(true),
        debug_apdu: cli.debug_apdu.then_some(true),
        timeout_secs: cli.timeout,
        auto_process: manual_download.then_some(false),
        log_dir: cli.log_dir.clone(),
    }
}

/// Print an error report and pick the exit code.
fn report(error: &anyhow::Error) -> ExitCode {
    if let Some(lpac_error) = error.downcast_ref::<LpacError>() {
        warn!(kind = ?lpac_error.kind(), "lpac invocation failed");
        eprint!("{}", display_for_user(lpac_error));
        return ExitCode::from(lpac_error);
    }

    eprintln!("Error: {error:#}");
    ExitCode::INTERNAL
}
