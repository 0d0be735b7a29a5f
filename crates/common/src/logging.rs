//! `tracing` subscriber setup shared by all service binaries

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LogFormat};

/// Build the `EnvFilter` for a configuration, rejecting malformed directives
pub fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(&config.filter)
        .map_err(|e| anyhow!("Invalid log filter '{}': {}", config.filter, e))
}

/// Install the global subscriber.
///
/// JSON output carries the current span so `trace_id` and `service` fields
/// from the request span land on every line. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.format {
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!(
        service = %config.service_name,
        format = %config.format,
        "Tracing initialized"
    );

    Ok(())
}
