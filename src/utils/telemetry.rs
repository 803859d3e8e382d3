//! Logging setup
//!
//! Installs the global `tracing` subscriber used by the binary. Library code
//! only emits events; it never installs a subscriber itself.

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "queer_memory=info";

/// Build the level filter from `RUST_LOG`, falling back to `default`
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a registry with an env filter and a compact fmt layer on stderr,
/// so log lines never interleave with rendered listings on stdout.
pub fn init_logging() -> Result<()> {
    Registry::default()
        .with(env_filter(DEFAULT_FILTER))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}
