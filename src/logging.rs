//! Tracing setup for the CLI.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `--debug` selects debug-level crate
/// logs, `--verbose` selects info, and the default shows warnings only.
/// Output goes to stderr so stdout stays parseable.
pub fn init(debug: bool, verbose: bool) {
    let default = if debug {
        "aer=debug"
    } else if verbose {
        "aer=info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
