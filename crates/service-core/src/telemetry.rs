//! Structured logging bootstrap.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

/// Install the JSON `tracing` subscriber for a service binary.
///
/// The filter comes from `RUST_LOG` and falls back to `info`. A second call
/// is harmless: the failure to replace the global subscriber is only logged.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}
