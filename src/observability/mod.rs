//! Log output setup
//!
//! The library only emits `tracing` events; binaries decide where they go.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: `RUST_LOG` if set, otherwise `level`.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| anyhow!("Invalid log level {:?}: {}", level, e)),
    }
}

/// Install a stderr `fmt` subscriber.
///
/// Stdout stays reserved for command output. Calling this twice returns an
/// error instead of replacing the first subscriber.
pub fn init_tracing(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(env_filter(level)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_level(true)
        .try_init()
        .map_err(|e| anyhow!("Log system initialization failed: {}", e))
}
