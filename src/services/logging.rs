//! Structured logging setup for the server binary.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter; `RUST_LOG` is consulted next.
pub const LOG_FILTER_ENV: &str = "IRHUB_LOG";

/// Installs a global `tracing` subscriber writing to stderr.
///
/// Stdout carries the RPC channel, so log lines must never go there.
/// Calling this twice is harmless; the second call is ignored.
pub fn init(service_name: &str) {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(service = service_name, "logging initialized");
    }
}
