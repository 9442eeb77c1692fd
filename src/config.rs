//! Configuration handling for the MySQL schema MCP server.
//!
//! Every option is read from the environment. Each variable also has a hidden
//! long flag for local experiments; none of them is part of the documented
//! interface. Empty environment values count as unset.

use crate::error::{DbError, DbResult};
use clap::Parser;
use sqlx::mysql::MySqlConnectOptions;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// Pool configuration defaults
pub const DEFAULT_MAX_CONNECTIONS: u32 = 2;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// How the target database of a tool call is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMode {
    /// Every call names its database through the `dbName` argument.
    PerRequest,
    /// `DB_NAME` was set at startup; `dbName` is neither advertised nor read.
    Fixed(String),
}

impl ServerMode {
    /// Derive the mode from an optional database name, taken verbatim.
    pub fn from_db_name(db_name: Option<&str>) -> Self {
        match non_empty(db_name) {
            Some(name) => Self::Fixed(name.to_string()),
            None => Self::PerRequest,
        }
    }

    pub fn fixed_database(&self) -> Option<&str> {
        match self {
            Self::Fixed(name) => Some(name),
            Self::PerRequest => None,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

impl fmt::Display for ServerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerRequest => write!(f, "per-request"),
            Self::Fixed(name) => write!(f, "fixed ({})", name),
        }
    }
}

/// Validated connection settings. Never carries a default schema.
#[derive(Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Sensitive - not logged
    pub password: Option<String>,
}

impl ConnectionSettings {
    /// Build driver options for a server-level connection.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .charset("utf8mb4");

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Configuration for the MySQL schema MCP server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mysql-schema-mcp",
    about = "MCP server for read-only MySQL schema introspection",
    version
)]
pub struct Config {
    /// MySQL server host
    #[arg(long, default_value = DEFAULT_DB_HOST, env = "DB_HOST", hide = true)]
    pub db_host: String,

    /// MySQL server port; empty means the default
    #[arg(
        long,
        default_value_t = DEFAULT_DB_PORT,
        env = "DB_PORT",
        value_parser = parse_port,
        hide = true
    )]
    pub db_port: u16,

    /// MySQL account name (required)
    #[arg(long, env = "DB_USER", hide = true)]
    pub db_user: Option<String>,

    /// MySQL account password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true, hide = true)]
    pub db_password: Option<String>,

    /// Fixed database name. When set, tools no longer take a `dbName` argument.
    #[arg(long, env = "DB_NAME", hide = true)]
    pub db_name: Option<String>,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "MCP_CONNECT_TIMEOUT",
        value_parser = parse_timeout_secs,
        hide = true
    )]
    pub connect_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL", hide = true)]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS", hide = true)]
    pub json_logs: bool,

    /// Enable logging output on stderr (disabled by default to keep stdio quiet)
    #[arg(long, env = "MCP_ENABLE_LOGS", hide = true)]
    pub enable_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            db_host: DEFAULT_DB_HOST.to_string(),
            db_port: DEFAULT_DB_PORT,
            db_user: None,
            db_password: None,
            db_name: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            log_level: "info".to_string(),
            json_logs: false,
            enable_logs: false,
        }
    }

    /// Validate the connection part of the configuration.
    pub fn connection_settings(&self) -> DbResult<ConnectionSettings> {
        let user = non_empty(self.db_user.as_deref())
            .ok_or_else(|| DbError::config("DB_USER environment variable is not set"))?;

        let host = non_empty(Some(self.db_host.as_str())).unwrap_or(DEFAULT_DB_HOST);

        Ok(ConnectionSettings {
            host: host.to_string(),
            port: self.db_port,
            user: user.to_string(),
            password: non_empty(self.db_password.as_deref()).map(String::from),
        })
    }

    /// The operating mode selected by `DB_NAME`.
    pub fn server_mode(&self) -> ServerMode {
        ServerMode::from_db_name(self.db_name.as_deref())
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Value parser for `DB_PORT`. An empty value selects [`DEFAULT_DB_PORT`].
fn parse_port(value: &str) -> Result<u16, String> {
    if value.is_empty() {
        return Ok(DEFAULT_DB_PORT);
    }
    value
        .parse()
        .map_err(|_| format!("'{}' is not a valid port number", value))
}

/// Value parser for `MCP_CONNECT_TIMEOUT`. Empty selects the default.
fn parse_timeout_secs(value: &str) -> Result<u64, String> {
    if value.is_empty() {
        return Ok(DEFAULT_CONNECT_TIMEOUT_SECS);
    }
    value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))
}
