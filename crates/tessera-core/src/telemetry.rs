//! Logging setup.
//!
//! Installs a `tracing` subscriber with an `EnvFilter` and either a
//! human-readable or a JSON formatting layer. `RUST_LOG` takes precedence
//! over the configured level.

use crate::{TesseraError, TesseraResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of the log layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-field human readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default level directive (trace, debug, info, warn, error).
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include the event target (module path) in each line.
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_with_target() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            with_target: default_with_target(),
        }
    }
}

impl LogConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[must_use]
    pub fn directive(&self) -> String {
        format!("{},tessera={},sqlx=warn", self.level, self.level)
    }
}

/// Installs the global subscriber.
///
/// Fails if a global subscriber was already installed.
pub fn init_logging(config: &LogConfig) -> TesseraResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.directive()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(config.with_target))
            .try_init(),
    };

    result.map_err(|e| TesseraError::Internal(format!("Failed to install log subscriber: {}", e)))?;

    tracing::info!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}
