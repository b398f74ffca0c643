//! Logging setup

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// Verbosity follows `RUST_LOG` and defaults to `info`:
/// - `RUST_LOG=debug` - every command and purchase step
/// - `RUST_LOG=liquor_store=trace` - everything from this crate
///
/// Logs go to stderr, one compact line per event, with the session span
/// (peer address) prefixed to everything a session logs.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
