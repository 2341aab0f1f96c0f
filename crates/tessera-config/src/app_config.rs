//! Application configuration structures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tessera_core::telemetry::LogConfig;
use url::Url;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: LogConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "tessera".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Database configuration.
///
/// Consumed once by the connection manager to build the pool.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Database name.
    pub database: String,
    /// SQL dialect (`postgresql` or `postgres`).
    pub dialect: String,
    /// Optional driver identifier appended to the dialect in the connection string.
    pub driver: Option<String>,
    /// Minimum connection pool size.
    pub min_connections: u32,
    /// Maximum connection pool size.
    pub max_connections: u32,
    /// Pool acquire timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds.
    pub idle_timeout_secs: u64,
    /// Enable SQL statement logging.
    pub log_queries: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            username: "tessera".to_string(),
            password: "tessera".to_string(),
            database: "tessera".to_string(),
            dialect: "postgresql".to_string(),
            driver: None,
            min_connections: 1,
            max_connections: 10,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
            log_queries: false,
        }
    }
}

impl DatabaseConfig {
    /// Dialects the connection manager can serve.
    pub const SUPPORTED_DIALECTS: &'static [&'static str] = &["postgresql", "postgres"];

    /// URL scheme: `dialect` or `dialect+driver`.
    #[must_use]
    pub fn scheme(&self) -> String {
        match self.driver.as_deref() {
            Some(driver) if !driver.is_empty() => format!("{}+{}", self.dialect, driver),
            _ => self.dialect.clone(),
        }
    }

    /// Returns `dialect[+driver]://user:password@host:port/database`.
    ///
    /// User name and password are percent-encoded.
    #[must_use]
    pub fn connection_string(&self) -> String {
        self.render(&self.password)
    }

    /// Connection string with the password masked, for logs.
    #[must_use]
    pub fn redacted_connection_string(&self) -> String {
        self.render("***")
    }

    fn render(&self, password: &str) -> String {
        match self.url(password) {
            Some(url) => url.into(),
            // Unparseable host; left raw so validation reports it.
            None => format!(
                "{}://{}:{}@{}:{}/{}",
                self.scheme(),
                self.username,
                password,
                self.host,
                self.port,
                self.database
            ),
        }
    }

    fn url(&self, password: &str) -> Option<Url> {
        let mut url = Url::parse(&format!("{}://{}:{}", self.scheme(), self.host, self.port)).ok()?;
        url.set_username(&self.username).ok()?;
        url.set_password(Some(password)).ok()?;
        url.set_path(&format!("/{}", self.database));
        Some(url)
    }

    /// Returns true if the dialect is served by the connection manager.
    #[must_use]
    pub fn is_supported_dialect(&self) -> bool {
        Self::SUPPORTED_DIALECTS.contains(&self.dialect.to_lowercase().as_str())
    }

    /// Returns the acquire timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the idle timeout as a Duration.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.redacted_connection_string())
            .field("min_connections", &self.min_connections)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("log_queries", &self.log_queries)
            .finish()
    }
}
