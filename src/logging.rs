//! Logging initialization for Lockbox
//!
//! Thin wrapper over `tracing-subscriber` so embedders and tests can set
//! up logging with one call. Initialization happens at most once per
//! process; later calls are ignored. Controllers log through `tracing`
//! macros and never include credential values in log messages.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize logging with an env-filter
///
/// Reads `RUST_LOG` when set, otherwise uses `default_directive` (for
/// example `"lockbox_core=info"`). Safe to call multiple times.
pub fn init_logging(default_directive: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

/// Initialize logging with the library default filter
pub fn init_default_logging() {
    init_logging("lockbox_core=info");
}

/// Check whether logging has been initialized
pub fn is_logging_initialized() -> bool {
    INIT.is_completed()
}
