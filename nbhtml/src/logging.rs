//! Diagnostic tracing for conversion runs.
//!
//! The converter's own stdout/stderr are not routed through here; by default
//! the child process writes straight to the terminal.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset, which keeps a
/// permissive run silent.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=nbhtml=debug nbhtml --root notebooks
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
