//! MySQL Schema MCP Server - Main entry point.
//!
//! Serves read-only schema introspection of a MySQL server to MCP clients
//! over stdio.

use mysql_schema_mcp::config::Config;
use mysql_schema_mcp::db::{ConnectionManager, MySqlSchemaRepository};
use mysql_schema_mcp::mcp::SchemaService;
use mysql_schema_mcp::transport::{StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout is reserved for JSON-RPC frames.
fn init_tracing(config: &Config) {
    if !config.enable_logs {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() {
    // Parse configuration from the environment (and optional flags)
    let config = Config::parse_args();

    init_tracing(&config);

    if let Err(e) = run(config).await {
        error!(error = %e, "Server error");
        eprintln!("Error: {}", e);
        if let Some(suggestion) = e.suggestion() {
            eprintln!("Hint: {}", suggestion);
        }
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

async fn run(config: Config) -> mysql_schema_mcp::error::DbResult<()> {
    let mode = config.server_mode();
    info!(
        mode = %mode,
        "Starting MySQL Schema MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let connections = ConnectionManager::connect(&config).await?;

    let repository = Arc::new(MySqlSchemaRepository::new(connections.pool().clone()));
    let service = SchemaService::new(repository, mode);

    let transport = StdioTransport::new(service, connections);
    info!(transport = transport.name(), "Serving");
    transport.run().await
}
