//! Logging configuration following 12-factor app principles
//!
//! Values come from environment variables (a `.env` file is honoured when
//! present) so the same binary runs unchanged across environments.

use anyhow::Result;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, for log shippers
    Json,
    /// Human readable multi-line output for local development
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(anyhow::anyhow!(
                "LOG_FORMAT must be 'json' or 'pretty', got '{}'",
                other
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Service name attached to every request span
    pub service_name: String,
    pub format: LogFormat,
    /// `EnvFilter` directives, e.g. `info,storefront_auth=debug`
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "storefront".to_string(),
            format: LogFormat::Json,
            filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Load logging configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Self::default();

        let format = match env::var("LOG_FORMAT") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.format,
        };

        Ok(Self {
            service_name: env::var("SERVICE_NAME")
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.service_name),
            format,
            filter: env::var("RUST_LOG").unwrap_or(defaults.filter),
        })
    }
}
