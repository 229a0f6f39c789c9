//! Logging initialization.
//!
//! Library code logs through `tracing`; the binary installs a stderr
//! subscriber so stdout stays clean for `show` and `--json`.

use tracing_subscriber::EnvFilter;

pub fn filter_directive(verbose: bool) -> &'static str {
    if verbose {
        "snapkeep=debug"
    } else {
        "snapkeep=warn"
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose)));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
