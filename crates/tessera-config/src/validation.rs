//! Configuration validation module.
//!
//! Fails fast on invalid configuration rather than at first database use.

use crate::{AppConfig, DatabaseConfig};
use std::fmt;
use tessera_core::telemetry::LogConfig;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { name: String, value: u16 },
    /// A required text setting is empty.
    MissingValue { name: String },
    /// Dialect is not served by the connection manager.
    UnsupportedDialect { value: String },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { value: u32, maximum: u32 },
    /// The assembled connection string does not parse as a URL.
    InvalidConnectionString { message: String },
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String, value: u64 },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {}: {} (must be 1-65535)", name, value)
            }
            Self::MissingValue { name } => write!(f, "Setting '{}' cannot be empty", name),
            Self::UnsupportedDialect { value } => {
                write!(
                    f,
                    "Unsupported database dialect '{}' (supported: {})",
                    value,
                    DatabaseConfig::SUPPORTED_DIALECTS.join(", ")
                )
            }
            Self::InvalidPoolSize { min, max } => {
                write!(
                    f,
                    "Invalid pool size: min ({}) cannot be greater than max ({})",
                    min, max
                )
            }
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "Pool size {} exceeds maximum allowed ({})", value, maximum)
            }
            Self::InvalidConnectionString { message } => {
                write!(f, "Invalid connection string: {}", message)
            }
            Self::NonPositiveTimeout { name, value } => {
                write!(f, "Timeout '{}' must be positive, got {}", name, value)
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: u32 = 1000;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_database(&config.database, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validates database configuration.
    fn validate_database(config: &DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
        for (name, value) in [
            ("database.host", &config.host),
            ("database.username", &config.username),
            ("database.database", &config.database),
        ] {
            if value.trim().is_empty() {
                errors.push(ConfigValidationError::MissingValue {
                    name: name.to_string(),
                });
            }
        }

        if config.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "database.port".to_string(),
                value: config.port,
            });
        }

        if !config.is_supported_dialect() {
            errors.push(ConfigValidationError::UnsupportedDialect {
                value: config.dialect.clone(),
            });
        }

        if let Err(e) = Url::parse(&config.connection_string()) {
            errors.push(ConfigValidationError::InvalidConnectionString {
                message: e.to_string(),
            });
        }

        // Pool size validation
        if config.min_connections > config.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: config.min_connections,
                max: config.max_connections,
            });
        }
        if config.max_connections > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: config.max_connections,
                maximum: Self::MAX_POOL_SIZE,
            });
        }

        // Timeouts
        if config.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.connect_timeout_secs".to_string(),
                value: 0,
            });
        }
        if config.idle_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.idle_timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    /// Validates logging configuration.
    fn validate_observability(config: &LogConfig, errors: &mut Vec<ConfigValidationError>) {
        let level = config.level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.level.clone(),
            });
        }
    }
}

/// Formats validation errors for display.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = AppConfig::default();
        config.database.port = 0;

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigValidationError::InvalidPort { name, .. } if name == "database.port"
        )));
    }

    #[test]
    fn test_missing_database_name() {
        let mut config = AppConfig::default();
        config.database.database = "  ".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigValidationError::MissingValue { name } if name == "database.database"
        )));
    }

    #[test]
    fn test_password_with_url_delimiters_passes() {
        let mut config = AppConfig::default();
        config.database.password = "s3cr#t/pw@?".to_string();

        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_unparseable_host_is_rejected() {
        let mut config = AppConfig::default();
        config.database.host = "db host".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::InvalidConnectionString { .. })));
    }

    #[test]
    fn test_unsupported_dialect() {
        let mut config = AppConfig::default();
        config.database.dialect = "sqlite".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::UnsupportedDialect { .. })));
    }

    #[test]
    fn test_invalid_pool_size() {
        let mut config = AppConfig::default();
        config.database.min_connections = 100;
        config.database.max_connections = 10;

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::InvalidPoolSize { .. })));
    }

    #[test]
    fn test_pool_size_too_large() {
        let mut config = AppConfig::default();
        config.database.max_connections = 2000;

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::PoolSizeTooLarge { .. })));
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = AppConfig::default();
        config.database.connect_timeout_secs = 0;

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigValidationError::NonPositiveTimeout { name, .. } if name == "database.connect_timeout_secs"
        )));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.observability.level = "verbose".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::InvalidLogLevel { .. })));
    }

    #[test]
    fn test_multiple_errors() {
        let mut config = AppConfig::default();
        config.database.port = 0;
        config.database.dialect = "oracle".to_string();
        config.observability.level = "loud".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors.len() >= 3);
    }

    #[test]
    fn test_format_validation_errors() {
        let errors = vec![
            ConfigValidationError::UnsupportedDialect {
                value: "mysql".to_string(),
            },
            ConfigValidationError::InvalidPort {
                name: "database.port".to_string(),
                value: 0,
            },
        ];

        let output = format_validation_errors(&errors);
        assert!(output.contains("Unsupported database dialect 'mysql'"));
        assert!(output.contains("Invalid port"));
    }
}
