//! Development-time tracing for debugging the wrapper.
//!
//! Tracing output goes to stderr and is filtered by `RUST_LOG`. It is never
//! part of the lint report, which is written by `core::outcome`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
///
/// # Example
/// ```bash
/// RUST_LOG=verify_lint=debug verify-lint
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
