//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use std::sync::Arc;
use tessera_core::TesseraError;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Prefix of environment variables that override file configuration.
pub const ENV_PREFIX: &str = "TESSERA";

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `{config_dir}/default.toml` - Default values
    /// 2. `{config_dir}/{environment}.toml` - Environment-specific overrides
    /// 3. `{config_dir}/local.toml` - Uncommitted local overrides
    /// 4. Environment variables with `TESSERA_` prefix (`__` separates sections)
    pub fn new(config_dir: impl Into<String>) -> Result<Self, TesseraError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, TesseraError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    ///
    /// The previous configuration stays in place if the new one is invalid.
    pub async fn reload(&self) -> Result<(), TesseraError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str) -> Result<AppConfig, TesseraError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var(format!("{}_ENVIRONMENT", ENV_PREFIX)).unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_tessera_error)?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_tessera_error)?;

        ConfigValidator::validate(&app_config)
            .map_err(|errors| TesseraError::Configuration(format_validation_errors(&errors)))?;

        info!(
            database = %app_config.database.redacted_connection_string(),
            "Configuration loaded"
        );

        Ok(app_config)
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("config_dir", &self.config_dir)
            .finish_non_exhaustive()
    }
}

fn config_error_to_tessera_error(err: ConfigError) -> TesseraError {
    TesseraError::Configuration(err.to_string())
}
