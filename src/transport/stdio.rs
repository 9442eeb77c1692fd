//! Stdio transport for the MCP server.
//!
//! This transport uses standard input/output for communication,
//! which is the standard mode for CLI-based MCP integrations.

use crate::db::{ConnectionManager, SchemaRepository};
use crate::error::{DbError, DbResult};
use crate::mcp::SchemaService;
use crate::transport::Transport;
use rmcp::{ServiceExt, transport::stdio};
use tokio::signal;
use tracing::{info, warn};

/// Stdio transport implementation.
///
/// Reads JSON-RPC messages from stdin and writes responses to stdout until
/// the peer closes stdin or a shutdown signal arrives, then closes the pool.
pub struct StdioTransport<R> {
    service: SchemaService<R>,
    connections: ConnectionManager,
}

impl<R: SchemaRepository + 'static> StdioTransport<R> {
    /// Create a new stdio transport.
    ///
    /// # Arguments
    ///
    /// * `service` - The MCP service answering requests
    /// * `connections` - Pool to close once serving stops
    pub fn new(service: SchemaService<R>, connections: ConnectionManager) -> Self {
        Self {
            service,
            connections,
        }
    }
}

impl<R: SchemaRepository + 'static> Transport for StdioTransport<R> {
    async fn run(&self) -> DbResult<()> {
        info!(mode = %self.service.mode(), "Starting MCP server with stdio transport");

        let running_service = self
            .service
            .clone()
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("Failed to start stdio transport: {}", e)))?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => {
                        info!("Stdio transport completed normally");
                    }
                    Err(e) => {
                        warn!(error = %e, "Stdio transport error");
                        self.connections.close().await;
                        return Err(DbError::internal(format!("Stdio transport error: {}", e)));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            // A second signal exits without waiting for cleanup
            tokio::spawn(async {
                wait_for_signal().await;
                warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        info!("Closing database connections");
        self.connections.close().await;

        if shutdown_requested {
            // The stdin reader may still be blocked; select! cannot interrupt it
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ServerMode};
    use crate::db::MySqlSchemaRepository;
    use sqlx::mysql::MySqlPoolOptions;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_stdio_transport_creation() {
        let config = Config {
            db_user: Some("reader".to_string()),
            ..Config::default()
        };
        let options = config.connection_settings().unwrap().connect_options();
        let pool = MySqlPoolOptions::new().connect_lazy_with(options);

        let repository = Arc::new(MySqlSchemaRepository::new(pool.clone()));
        let service = SchemaService::new(repository, ServerMode::PerRequest);
        let transport = StdioTransport::new(service, ConnectionManager::from_pool(pool));
        assert_eq!(transport.name(), "stdio");
    }
}
