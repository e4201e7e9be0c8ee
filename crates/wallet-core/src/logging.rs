//! # Structured Logging
//!
//! Installs the global `tracing` subscriber from [`LoggingConfig`]. The
//! filter comes from configuration only; `RUST_LOG` is not consulted.
//! Output goes to stderr.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::WalletError;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output for local development.
    #[default]
    Pretty,
    /// JSON lines for log aggregation.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `"info"` or `"chain_xvg=debug,info"`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn filter(&self) -> Result<EnvFilter, WalletError> {
        EnvFilter::try_new(&self.level)
            .map_err(|e| WalletError::Config(format!("invalid log filter '{}': {e}", self.level)))
    }
}

/// Install the global subscriber.
///
/// Fails instead of panicking when a subscriber is already installed, so
/// embedding applications that set up their own tracing keep theirs.
pub fn init_logging(config: &LoggingConfig) -> Result<(), WalletError> {
    let filter = config.filter()?;

    let result = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
            .try_init(),
    };
    result.map_err(|e| WalletError::Config(format!("logging already initialized: {e}")))?;

    tracing::info!(format = ?config.format, level = %config.level, "logging initialized");
    Ok(())
}
