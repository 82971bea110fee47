//! Logging configuration for BlueQuery.
//!
//! The service runs headless, so all logs go to stderr.

use tracing_subscriber::EnvFilter;

/// Initializes stderr logging.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
