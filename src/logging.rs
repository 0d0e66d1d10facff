//! Tracing/logging initialization
//!
//! Logs go to stderr so stdout carries only the report. The filter is read
//! from `RUST_LOG` and defaults to `warn`, which shows rejected operations
//! and skipped rows.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
