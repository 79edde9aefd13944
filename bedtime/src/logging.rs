//! Diagnostic tracing for the story loop.
//!
//! Output goes to stderr so it never interleaves with the story printed on
//! stdout. Controlled via `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset, which still shows judge
/// parse failures and exhausted attempts.
///
/// # Example
/// ```bash
/// RUST_LOG=bedtime=info cargo run
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
