//! Log output for applications built on the SDK.
//!
//! The SDK itself only emits `tracing` events; nothing is printed unless
//! the application installs a subscriber. [`init`] installs the usual one.

use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber filtered by `RUST_LOG`, falling back
/// to `default_directive` (e.g. `"info"` or `"queueline=debug"`).
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
