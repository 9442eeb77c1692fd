//! MySQL Schema MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools that let AI
//! assistants read the schema of a MySQL database: tables, columns, keys and
//! indexes, rendered as plain text.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::{Config, ServerMode};
pub use error::DbError;
pub use mcp::SchemaService;
