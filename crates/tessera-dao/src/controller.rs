//! Connection manager: one lazily built pool, sessions on demand.

use crate::session::Session;
use async_trait::async_trait;
use shaku::Component;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::ConnectOptions;
use tessera_config::DatabaseConfig;
use tessera_core::{Interface, TesseraError, TesseraResult};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Interface for the connection manager.
#[async_trait]
pub trait DatabaseController: Interface + Send + Sync {
    /// Builds the connection pool. Later calls log a warning and do nothing.
    async fn setup(&self) -> TesseraResult<()>;

    /// Returns true once the pool exists.
    fn is_setup(&self) -> bool;

    /// Opens a session, setting the pool up first if needed.
    async fn session(&self) -> TesseraResult<Session>;

    /// Checks that the database answers.
    async fn health_check(&self) -> TesseraResult<()>;

    /// Closes the pool.
    async fn close(&self);
}

/// PostgreSQL connection manager.
#[derive(Component)]
#[shaku(interface = DatabaseController)]
pub struct DbController {
    config: DatabaseConfig,
    #[shaku(default)]
    pool: OnceCell<PgPool>,
}

impl DbController {
    /// Creates a controller; no connection is made until first use.
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// The pool, if set up.
    #[must_use]
    pub fn inner(&self) -> Option<&PgPool> {
        self.pool.get()
    }

    async fn pool(&self) -> TesseraResult<&PgPool> {
        self.pool
            .get_or_try_init(|| async { self.build_pool() })
            .await
    }

    fn build_pool(&self) -> TesseraResult<PgPool> {
        let config = &self.config;
        if !config.is_supported_dialect() {
            return Err(TesseraError::configuration(format!(
                "Unsupported database dialect '{}'",
                config.dialect
            )));
        }

        info!(
            "Creating PostgreSQL connection pool for {}",
            config.redacted_connection_string()
        );

        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);
        if !config.log_queries {
            options = options.disable_statement_logging();
        }

        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .test_before_acquire(true)
            .connect_lazy_with(options);

        info!(
            max_connections = config.max_connections,
            "PostgreSQL connection pool ready"
        );
        Ok(pool)
    }
}

#[async_trait]
impl DatabaseController for DbController {
    async fn setup(&self) -> TesseraResult<()> {
        if self.pool.initialized() {
            warn!("Database controller is already set up");
            return Ok(());
        }
        self.pool().await.map(|_| ())
    }

    fn is_setup(&self) -> bool {
        self.pool.initialized()
    }

    async fn session(&self) -> TesseraResult<Session> {
        let pool = self.pool().await?;
        let tx = pool.begin().await?;
        Ok(Session::new(tx))
    }

    async fn health_check(&self) -> TesseraResult<()> {
        let pool = self.pool().await?;
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map_err(|e| TesseraError::Connection(format!("Health check failed: {}", e)))?;
        debug!("Database health check passed");
        Ok(())
    }

    async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            info!("Closing database connection pool...");
            pool.close().await;
            info!("Database connection pool closed");
        }
    }
}

impl std::fmt::Debug for DbController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("DbController");
        debug.field("config", &self.config);
        if let Some(pool) = self.pool.get() {
            debug.field("size", &pool.size()).field("num_idle", &pool.num_idle());
        }
        debug.finish()
    }
}
