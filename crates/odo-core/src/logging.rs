//! Diagnostic logging setup
//!
//! User facing output goes through the prompts; `tracing` events are
//! diagnostics written to stderr, silent below warnings by default.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an explicit log filter (`debug`, `odo_core=trace`, ...)
pub const LOG_ENV: &str = "ODO_LOG";

/// Filter directive for a `-v` count
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber
///
/// `ODO_LOG` wins over the verbosity when set. Calling this twice is harmless.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
