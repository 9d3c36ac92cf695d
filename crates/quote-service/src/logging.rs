//! # Logging Setup
//!
//! Initializes the `tracing` subscriber for structured logging.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=quote=trace` - Show trace for quote crates only
//! - Default: `info,quote=debug,sqlx=warn`

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,quote=debug,sqlx=warn";

/// Installs the global subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Subscriber for tests: output goes through the test harness capture.
///
/// Safe to call from every test; only the first call installs it.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug,sqlx=warn"))
        .with_test_writer()
        .try_init();
}
