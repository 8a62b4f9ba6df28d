//! Logging initialisation
//!
//! The library only emits `tracing` events; binaries and tests decide where
//! they go.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a formatting subscriber filtered by `RUST_LOG` (default `info`)
///
/// # Example
/// ```no_run
/// use cold_storage_simulator_core_rs::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Debug-level subscriber for tests; safe to call more than once
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
