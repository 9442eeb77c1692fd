//! Error types for the MySQL schema MCP server.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Tool-level failures are rendered with `Display` straight into the text of an
//! MCP tool-error result, so each message is written to be read by the AI
//! assistant on the other end.

use std::fmt;
use thiserror::Error;

/// The schema object a repository query was fetching when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSubject {
    Tables,
    PrimaryKeys,
    UniqueKeys,
    ForeignKeys,
    Columns,
    Indexes,
}

impl fmt::Display for FetchSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tables => write!(f, "table"),
            Self::PrimaryKeys => write!(f, "primary key"),
            Self::UniqueKeys => write!(f, "unique key"),
            Self::ForeignKeys => write!(f, "foreign key"),
            Self::Columns => write!(f, "column"),
            Self::Indexes => write!(f, "index"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database '{database}' not found: {hint}")]
    DatabaseNotFound { database: String, hint: String },

    #[error("Failed to get {subject} information: {source}")]
    Fetch {
        subject: FetchSubject,
        #[source]
        source: sqlx::Error,
    },

    /// Bad tool arguments; the message is shown verbatim.
    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database not found error.
    pub fn database_not_found(database: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::DatabaseNotFound {
            database: database.into(),
            hint: hint.into(),
        }
    }

    /// Wrap a driver error raised while fetching `subject`.
    pub fn fetch(subject: FetchSubject, source: sqlx::Error) -> Self {
        Self::Fetch { subject, source }
    }

    /// Create an invalid tool argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unknown tool error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::DatabaseNotFound { hint, .. } => Some(hint),
            _ => None,
        }
    }

}

/// Convert sqlx errors raised outside the repository (connect, ping,
/// existence check) to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check DB_HOST, DB_PORT, DB_USER and DB_PASSWORD",
            ),
            sqlx::Error::Database(db_err) => DbError::connection(
                db_err.message().to_string(),
                "Check that the account exists and may read INFORMATION_SCHEMA",
            ),
            sqlx::Error::PoolTimedOut => DbError::connection(
                "Timed out acquiring a connection",
                "Check network connectivity and database server status",
            ),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Restart the server")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Build suggestion data as JSON value.
fn suggestion_data(suggestion: Option<&str>) -> Option<serde_json::Value> {
    suggestion.map(|s| serde_json::json!({ "suggestion": s }))
}

/// Convert DbError to MCP ErrorData for failures that are reported at the
/// JSON-RPC level rather than as tool-error results.
impl From<DbError> for rmcp::ErrorData {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::UnknownTool { .. } => rmcp::ErrorData::invalid_params(err.to_string(), None),
            _ => rmcp::ErrorData::internal_error(err.to_string(), suggestion_data(err.suggestion())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display_names_subject() {
        let err = DbError::fetch(
            FetchSubject::Columns,
            sqlx::Error::Protocol("connection reset".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Failed to get column information: encountered unexpected or invalid data: connection reset"
        );
    }

    #[test]
    fn test_fetch_subject_labels() {
        assert_eq!(FetchSubject::Tables.to_string(), "table");
        assert_eq!(FetchSubject::PrimaryKeys.to_string(), "primary key");
        assert_eq!(FetchSubject::UniqueKeys.to_string(), "unique key");
        assert_eq!(FetchSubject::ForeignKeys.to_string(), "foreign key");
        assert_eq!(FetchSubject::Indexes.to_string(), "index");
    }

    #[test]
    fn test_invalid_argument_is_shown_verbatim() {
        let err = DbError::invalid_argument("Database name is not specified");
        assert_eq!(err.to_string(), "Database name is not specified");
    }

    #[test]
    fn test_error_suggestion() {
        let err = DbError::connection("refused", "Check DB_HOST");
        assert_eq!(err.suggestion(), Some("Check DB_HOST"));
        assert_eq!(DbError::Cancelled.suggestion(), None);
    }

    #[test]
    fn test_sqlx_io_error_maps_to_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: DbError = sqlx::Error::Io(io).into();
        assert!(matches!(err, DbError::Connection { .. }));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_unknown_tool_maps_to_invalid_params() {
        let mcp_err: rmcp::ErrorData = DbError::unknown_tool("drop_tables").into();
        assert_eq!(mcp_err.code.0, -32602);
        assert!(mcp_err.message.contains("drop_tables"));
    }

    #[test]
    fn test_internal_maps_to_internal_error() {
        let mcp_err: rmcp::ErrorData = DbError::internal("boom").into();
        assert_eq!(mcp_err.code.0, -32603);
    }

    #[test]
    fn test_connection_error_carries_suggestion_data() {
        let mcp_err: rmcp::ErrorData = DbError::connection("refused", "Check DB_HOST").into();
        assert_eq!(mcp_err.code.0, -32603);
        assert_eq!(mcp_err.data.unwrap()["suggestion"], "Check DB_HOST");
    }
}
