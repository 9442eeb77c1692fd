//! MCP tool implementations.
//!
//! - `schema`: argument handling and orchestration for `list_tables` and `describe_tables`
//! - `format`: text rendering of the tool output

pub mod format;
pub mod schema;

pub use schema::{DescribeTablesInput, ListTablesInput, SchemaToolHandler};
