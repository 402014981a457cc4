//! Tracing/logging initialization.

use crate::config::Environment;
use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// The filter comes from `RUST_LOG` (default `info`). Production writes JSON
/// lines; development writes human-readable output. Safe to call multiple
/// times (subsequent calls are no-ops).
pub fn init(environment: Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let _ = if environment.is_development() {
        builder.try_init()
    } else {
        builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init()
    };
}
