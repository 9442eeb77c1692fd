//! Schema introspection tools.
//!
//! This module implements the `list_tables` and `describe_tables` MCP tools:
//! argument validation, database selection, repository calls and rendering.
//! Every failure comes back as a [`DbError`] whose `Display` is the text of
//! the tool-error result.

use crate::config::ServerMode;
use crate::db::schema::SchemaRepository;
use crate::error::{DbError, DbResult};
use crate::models::TableDetail;
use crate::tools::format::{
    NO_TABLES_MESSAGE, TABLE_SEPARATOR, render_table_detail, render_table_list,
    render_table_not_found,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

pub const DB_NAME_ARG: &str = "dbName";
pub const TABLE_NAMES_ARG: &str = "tableNames";

/// Input for the list_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListTablesInput {
    /// The name of the database to retrieve information from.
    pub db_name: String,
}

/// Input for the describe_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DescribeTablesInput {
    /// The name of the database to retrieve information from.
    pub db_name: String,
    /// The names of the tables to retrieve detailed information for (multiple names can be specified).
    pub table_names: Vec<String>,
}

/// Pick the database a call runs against.
///
/// Fixed mode ignores the arguments entirely.
pub fn resolve_database(mode: &ServerMode, args: &Map<String, Value>) -> DbResult<String> {
    if let Some(database) = mode.fixed_database() {
        return Ok(database.to_string());
    }

    match args.get(DB_NAME_ARG) {
        None => Err(DbError::invalid_argument("Database name is not specified")),
        Some(Value::String(name)) if !name.is_empty() => Ok(name.clone()),
        Some(_) => Err(DbError::invalid_argument(
            "Database name is not specified correctly",
        )),
    }
}

/// Read `tableNames`, skipping entries that are not non-empty strings.
pub fn parse_table_names(args: &Map<String, Value>) -> DbResult<Vec<String>> {
    let entries = match args.get(TABLE_NAMES_ARG) {
        None => return Err(DbError::invalid_argument("Table names are not specified")),
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        Some(_) => {
            return Err(DbError::invalid_argument(
                "Table names array is not specified correctly",
            ));
        }
    };

    let names: Vec<String> = entries
        .iter()
        .filter_map(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();

    if names.is_empty() {
        return Err(DbError::invalid_argument(
            "No valid table names are specified",
        ));
    }

    Ok(names)
}

pub struct SchemaToolHandler<R> {
    repository: Arc<R>,
    mode: ServerMode,
}

impl<R> Clone for SchemaToolHandler<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            mode: self.mode.clone(),
        }
    }
}

impl<R: SchemaRepository> SchemaToolHandler<R> {
    pub fn new(repository: Arc<R>, mode: ServerMode) -> Self {
        Self { repository, mode }
    }

    pub fn mode(&self) -> &ServerMode {
        &self.mode
    }

    pub async fn list_tables(&self, args: &Map<String, Value>) -> DbResult<String> {
        let database = resolve_database(&self.mode, args)?;
        let tables = self.repository.fetch_all_table_summaries(&database).await?;

        info!(database = %database, count = tables.len(), "Listed tables");

        if tables.is_empty() {
            return Ok(NO_TABLES_MESSAGE.to_string());
        }
        Ok(render_table_list(&database, &tables))
    }

    pub async fn describe_tables(&self, args: &Map<String, Value>) -> DbResult<String> {
        let database = resolve_database(&self.mode, args)?;
        let table_names = parse_table_names(args)?;

        let summaries = self.repository.fetch_all_table_summaries(&database).await?;

        let mut blocks = Vec::with_capacity(table_names.len());
        for name in &table_names {
            let Some(summary) = summaries.iter().find(|t| &t.name == name) else {
                blocks.push(render_table_not_found(name));
                continue;
            };

            let repo = &self.repository;
            let detail = TableDetail {
                name: name.clone(),
                comment: summary.comment.clone(),
                primary_key: repo.fetch_primary_keys(&database, name).await?,
                unique_keys: repo.fetch_unique_keys(&database, name).await?,
                foreign_keys: repo.fetch_foreign_keys(&database, name).await?,
                columns: repo.fetch_columns(&database, name).await?,
                indexes: repo.fetch_indexes(&database, name).await?,
            };
            blocks.push(render_table_detail(&detail));
        }

        info!(
            database = %database,
            requested = table_names.len(),
            "Described tables"
        );

        Ok(blocks.join(TABLE_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_resolve_database_per_request() {
        let mode = ServerMode::PerRequest;
        let db = resolve_database(&mode, &args(json!({"dbName": "shop"}))).unwrap();
        assert_eq!(db, "shop");
    }

    #[test]
    fn test_resolve_database_missing() {
        let err = resolve_database(&ServerMode::PerRequest, &Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Database name is not specified");
    }

    #[test]
    fn test_resolve_database_wrong_type() {
        for bad in [json!({"dbName": null}), json!({"dbName": 42}), json!({"dbName": ""})] {
            let err = resolve_database(&ServerMode::PerRequest, &args(bad)).unwrap_err();
            assert_eq!(err.to_string(), "Database name is not specified correctly");
        }
    }

    #[test]
    fn test_fixed_mode_ignores_argument() {
        let mode = ServerMode::Fixed("shop".to_string());
        let db = resolve_database(&mode, &args(json!({"dbName": "other"}))).unwrap();
        assert_eq!(db, "shop");
        assert_eq!(resolve_database(&mode, &Map::new()).unwrap(), "shop");
    }

    #[test]
    fn test_table_names_missing() {
        let err = parse_table_names(&Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Table names are not specified");
    }

    #[test]
    fn test_table_names_not_array_or_empty() {
        for bad in [json!({"tableNames": "users"}), json!({"tableNames": []})] {
            let err = parse_table_names(&args(bad)).unwrap_err();
            assert_eq!(err.to_string(), "Table names array is not specified correctly");
        }
    }

    #[test]
    fn test_table_names_without_valid_entries() {
        let err = parse_table_names(&args(json!({"tableNames": ["", 1, null]}))).unwrap_err();
        assert_eq!(err.to_string(), "No valid table names are specified");
    }

    #[test]
    fn test_table_names_skip_invalid_entries() {
        let names =
            parse_table_names(&args(json!({"tableNames": ["users", 3, "", "orders"]}))).unwrap();
        assert_eq!(names, vec!["users", "orders"]);
    }

    #[test]
    fn test_input_uses_camel_case() {
        let input: DescribeTablesInput =
            serde_json::from_value(json!({"dbName": "shop", "tableNames": ["users"]})).unwrap();
        assert_eq!(input.db_name, "shop");
        assert_eq!(input.table_names, vec!["users"]);
    }
}
