//! Integration test harness.

mod fallback_test;
mod persistence_test;
mod reminders_test;

use tracing_subscriber::EnvFilter;

/// Install a tracing subscriber once so fallback warnings are visible when
/// tests run with RUST_LOG set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init();
}
