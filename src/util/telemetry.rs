//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

/// Initialize tracing with the `RUST_LOG` filter, falling back to `info`.
/// Users can install their own subscriber; in that case this is a no-op.
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Initialize tracing with an explicit fallback directive used when
/// `RUST_LOG` is unset or unparsable (e.g. `"shop_monitor=debug"`).
pub fn init_tracing_with_default(default_directive: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}
