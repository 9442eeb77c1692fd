//! Connection pool management.
//!
//! One server-level MySQL pool is opened at startup and shared by every
//! request. The pool never selects a default schema; each query names its
//! database explicitly.

use crate::config::{
    Config, ConnectionSettings, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MIN_CONNECTIONS,
};
use crate::error::{DbError, DbResult};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::Connection;
use std::time::Duration;
use tracing::{debug, info, warn};

const SCHEMA_EXISTS_QUERY: &str =
    "SELECT COUNT(*) FROM INFORMATION_SCHEMA.SCHEMATA WHERE SCHEMA_NAME = ?";

/// Owns the shared MySQL pool.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    pool: MySqlPool,
}

impl ConnectionManager {
    /// Open the pool described by `config` and verify it with a ping.
    ///
    /// In fixed mode the configured database must also exist.
    pub async fn connect(config: &Config) -> DbResult<Self> {
        let settings = config.connection_settings()?;
        let pool = create_pool(&settings, config.connect_timeout_duration()).await?;
        let manager = Self { pool };

        manager.ping().await?;

        if let Some(database) = config.server_mode().fixed_database() {
            manager.ensure_database_exists(database).await?;
        }

        let server_version = manager.server_version().await;
        info!(
            host = %settings.host,
            port = settings.port,
            server_version = ?server_version,
            "Connected successfully"
        );

        Ok(manager)
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// The shared pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Round-trip to the server on a pooled connection.
    pub async fn ping(&self) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await.map_err(|e| {
            DbError::connection(
                format!("Failed to ping database: {}", e),
                "Check that the MySQL server is running and accessible",
            )
        })?;
        debug!("Ping succeeded");
        Ok(())
    }

    /// Fail with `DatabaseNotFound` unless `database` is a schema on the server.
    pub async fn ensure_database_exists(&self, database: &str) -> DbResult<()> {
        let count = sqlx::query_scalar::<_, i64>(SCHEMA_EXISTS_QUERY)
            .bind(database)
            .fetch_one(&self.pool)
            .await?;

        if count == 0 {
            return Err(DbError::database_not_found(
                database,
                "Verify DB_NAME and that the account can see the schema",
            ));
        }

        debug!(database = %database, "Database exists");
        Ok(())
    }

    async fn server_version(&self) -> Option<String> {
        match sqlx::query_scalar::<_, String>("SELECT version()")
            .fetch_one(&self.pool)
            .await
        {
            Ok(version) => Some(version),
            Err(e) => {
                warn!(error = %e, "Failed to get server version");
                None
            }
        }
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("All connections closed");
    }
}

async fn create_pool(settings: &ConnectionSettings, connect_timeout: Duration) -> DbResult<MySqlPool> {
    debug!(settings = ?settings, "Creating connection pool");

    MySqlPoolOptions::new()
        .min_connections(DEFAULT_MIN_CONNECTIONS)
        .max_connections(DEFAULT_MAX_CONNECTIONS)
        .acquire_timeout(connect_timeout)
        .idle_timeout(Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)))
        .test_before_acquire(true)
        .connect_with(settings.connect_options())
        .await
        .map_err(|e| {
            DbError::connection(
                format!("Failed to connect: {}", e),
                connection_suggestion(&e),
            )
        })
}

/// Generate a helpful suggestion for connection errors.
fn connection_suggestion(error: &sqlx::Error) -> String {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") {
        return "Check that the MySQL server is running and reachable at DB_HOST:DB_PORT"
            .to_string();
    }

    if error_str.contains("access denied") || error_str.contains("password") {
        return "Verify DB_USER and DB_PASSWORD".to_string();
    }

    if error_str.contains("tls") || error_str.contains("ssl") {
        return "Check TLS/SSL configuration or try disabling it".to_string();
    }

    "Verify DB_HOST, DB_PORT, DB_USER and DB_PASSWORD".to_string()
}
