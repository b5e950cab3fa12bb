//! Diagnostic logging setup.
//!
//! User-facing output goes to stdout through [`colored`]; `tracing` events
//! are diagnostics only and go to stderr. `RUST_LOG` takes precedence,
//! otherwise `--verbose` selects `debug` for this crate.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Safe to call once per process.
pub fn init(verbose: bool) {
    let default = if verbose {
        "threadline=debug,warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
