//! Logging configuration for tabletalk.
//!
//! Logs go to stderr so that answers printed on stdout stay clean and
//! pipeable.

use tracing_subscriber::EnvFilter;

/// Initializes logging to stderr with an env-filter.
///
/// Respects `RUST_LOG` if set, defaulting to `info`.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
