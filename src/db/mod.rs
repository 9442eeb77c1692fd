//! Database access layer.
//!
//! - Connection pool management and startup checks
//! - Schema introspection over `INFORMATION_SCHEMA`

pub mod pool;
pub mod schema;

pub use pool::ConnectionManager;
pub use schema::{MySqlSchemaRepository, SchemaRepository};
