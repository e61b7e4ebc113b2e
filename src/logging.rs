//! Tracing initialisation for the binary
//!
//! Diagnostics go to stderr so stdout stays parseable with `--json`. The lpac
//! transcript (`LogSink`) is separate and always written.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the `easylpac*` targets log at info
/// (debug with `verbose`) and everything else at warn (info with `verbose`).
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "easylpac=debug,info"
    } else {
        "easylpac=info,warn"
    }
}
