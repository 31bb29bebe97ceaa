//! Tracing subscriber bootstrap for host applications
//!
//! The client crates only emit `tracing` events. Applications that want the
//! same log setup the workspace uses in development call [`init`] once.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the filter: `LOG_LEVEL`, then `RUST_LOG`, then `default_directive`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install a global JSON subscriber.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_directive: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .is_ok()
}
