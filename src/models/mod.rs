//! Data models for the MySQL schema MCP server.
//!
//! This module re-exports all model types used throughout the application.

pub mod schema;

pub use schema::{ColumnInfo, ForeignKey, IndexInfo, TableDetail, TableSummary, UniqueKey};
