//! Common test infrastructure for database integration tests.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;
use tessera_config::DatabaseConfig;
use tessera_dao::{DatabaseController, DbController, Session};
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;

/// Test database container wrapper.
///
/// Manages a PostgreSQL testcontainer lifecycle and provides a controller
/// with the fixture schema applied.
pub struct TestDatabase {
    _container: ContainerAsync<Postgres>,
    config: DatabaseConfig,
    controller: Arc<DbController>,
}

impl TestDatabase {
    /// Starts a fresh PostgreSQL container and creates the fixture tables.
    pub async fn new() -> Self {
        let container = Postgres::default()
            .start()
            .await
            .expect("Failed to start PostgreSQL container");

        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get PostgreSQL port");

        let config = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port,
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "postgres".to_string(),
            min_connections: 1,
            max_connections: 5,
            log_queries: true,
            ..DatabaseConfig::default()
        };

        let controller = Arc::new(DbController::new(config.clone()));
        Self::wait_until_ready(&controller, 30).await;
        Self::apply_schema(&controller).await;

        Self {
            _container: container,
            config,
            controller,
        }
    }

    /// Returns the controller.
    pub fn controller(&self) -> Arc<DbController> {
        Arc::clone(&self.controller)
    }

    /// Connection settings of the container.
    pub fn config(&self) -> DatabaseConfig {
        self.config.clone()
    }

    /// Opens a new session.
    pub async fn session(&self) -> Session {
        self.controller
            .session()
            .await
            .expect("Failed to open session")
    }

    async fn wait_until_ready(controller: &DbController, max_attempts: u32) {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match controller.health_check().await {
                Ok(()) => return,
                Err(e) => {
                    if attempts >= max_attempts {
                        panic!("Database not ready after {} attempts: {}", max_attempts, e);
                    }
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                }
            }
        }
    }

    async fn apply_schema(controller: &DbController) {
        let mut session = controller.session().await.expect("Failed to open session");
        sqlx::raw_sql(fixtures::SCHEMA)
            .execute(session.connection())
            .await
            .expect("Failed to create schema");
        session.commit().await.expect("Failed to commit schema");
    }
}
