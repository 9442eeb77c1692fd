//! Schema introspection module.
//!
//! Reads table, column, key and index metadata from `INFORMATION_SCHEMA`.
//!
//! # Architecture
//!
//! SQL queries live in the `queries` submodule. The [`SchemaRepository`] trait
//! is the seam the tool layer talks to; [`MySqlSchemaRepository`] is the
//! production implementation. Grouped queries (unique keys, foreign keys,
//! indexes) return one row per (constraint, column) pair sorted by constraint
//! name, and are folded in a single pass that appends to the last record while
//! the name repeats. The server's order is kept as is; nothing is re-sorted.

use crate::error::{DbError, DbResult, FetchSubject};
use crate::models::{ColumnInfo, ForeignKey, IndexInfo, TableSummary, UniqueKey};
use futures_util::TryStreamExt;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::Row;
use std::future::Future;
use tracing::debug;

/// Read-only access to the schema metadata of one MySQL server.
///
/// Every operation takes the database name as an argument; implementations
/// must bind it as a query parameter and never splice it into SQL text.
pub trait SchemaRepository: Send + Sync {
    /// Table names and comments, ordered by table name.
    fn fetch_table_comments(
        &self,
        database: &str,
    ) -> impl Future<Output = DbResult<Vec<TableSummary>>> + Send;

    /// Primary key columns in `ORDINAL_POSITION` order; empty if none.
    fn fetch_primary_keys(
        &self,
        database: &str,
        table: &str,
    ) -> impl Future<Output = DbResult<Vec<String>>> + Send;

    fn fetch_unique_keys(
        &self,
        database: &str,
        table: &str,
    ) -> impl Future<Output = DbResult<Vec<UniqueKey>>> + Send;

    fn fetch_foreign_keys(
        &self,
        database: &str,
        table: &str,
    ) -> impl Future<Output = DbResult<Vec<ForeignKey>>> + Send;

    fn fetch_columns(
        &self,
        database: &str,
        table: &str,
    ) -> impl Future<Output = DbResult<Vec<ColumnInfo>>> + Send;

    /// Secondary indexes, excluding `PRIMARY` and any index named after a
    /// UNIQUE or FOREIGN KEY constraint of the same table.
    fn fetch_indexes(
        &self,
        database: &str,
        table: &str,
    ) -> impl Future<Output = DbResult<Vec<IndexInfo>>> + Send;

    /// Every table of `database` with its primary, unique and foreign keys.
    ///
    /// Runs the per-table queries one after another and stops at the first
    /// failure; no partial result is returned.
    fn fetch_all_table_summaries(
        &self,
        database: &str,
    ) -> impl Future<Output = DbResult<Vec<TableSummary>>> + Send {
        async move {
            let mut tables = self.fetch_table_comments(database).await?;

            for table in tables.iter_mut() {
                table.primary_key = self.fetch_primary_keys(database, &table.name).await?;
                table.unique_keys = self.fetch_unique_keys(database, &table.name).await?;
                table.foreign_keys = self.fetch_foreign_keys(database, &table.name).await?;
            }

            debug!(
                database = %database,
                count = tables.len(),
                "Fetched table summaries"
            );
            Ok(tables)
        }
    }
}

// =============================================================================
// SQL Query Templates
// =============================================================================

mod queries {
    pub const TABLE_COMMENTS: &str = r#"
        SELECT
            TABLE_NAME AS TABLE_NAME,
            IFNULL(TABLE_COMMENT, '') AS TABLE_COMMENT
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = ?
        ORDER BY TABLE_NAME
        "#;

    pub const PRIMARY_KEYS: &str = r#"
        SELECT
            COLUMN_NAME AS COLUMN_NAME
        FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
        WHERE CONSTRAINT_SCHEMA = ?
        AND TABLE_NAME = ?
        AND CONSTRAINT_NAME = 'PRIMARY'
        ORDER BY ORDINAL_POSITION
        "#;

    pub const UNIQUE_KEYS: &str = r#"
        SELECT
            kcu.CONSTRAINT_NAME AS CONSTRAINT_NAME,
            kcu.COLUMN_NAME AS COLUMN_NAME
        FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
        JOIN INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
            ON kcu.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA
            AND kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
            AND kcu.TABLE_NAME = tc.TABLE_NAME
        WHERE kcu.TABLE_SCHEMA = ?
        AND kcu.TABLE_NAME = ?
        AND tc.CONSTRAINT_TYPE = 'UNIQUE'
        ORDER BY kcu.CONSTRAINT_NAME, kcu.ORDINAL_POSITION
        "#;

    pub const FOREIGN_KEYS: &str = r#"
        SELECT
            kcu.CONSTRAINT_NAME AS CONSTRAINT_NAME,
            kcu.COLUMN_NAME AS COLUMN_NAME,
            kcu.REFERENCED_TABLE_NAME AS REFERENCED_TABLE_NAME,
            kcu.REFERENCED_COLUMN_NAME AS REFERENCED_COLUMN_NAME
        FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
        JOIN INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS rc
            ON kcu.CONSTRAINT_SCHEMA = rc.CONSTRAINT_SCHEMA
            AND kcu.CONSTRAINT_NAME = rc.CONSTRAINT_NAME
        WHERE kcu.TABLE_SCHEMA = ?
        AND kcu.TABLE_NAME = ?
        AND kcu.REFERENCED_TABLE_NAME IS NOT NULL
        ORDER BY kcu.CONSTRAINT_NAME, kcu.ORDINAL_POSITION
        "#;

    pub const COLUMNS: &str = r#"
        SELECT
            COLUMN_NAME AS COLUMN_NAME,
            COLUMN_TYPE AS COLUMN_TYPE,
            IS_NULLABLE AS IS_NULLABLE,
            COLUMN_DEFAULT AS COLUMN_DEFAULT,
            IFNULL(COLUMN_COMMENT, '') AS COLUMN_COMMENT
        FROM INFORMATION_SCHEMA.COLUMNS
        WHERE TABLE_SCHEMA = ?
        AND TABLE_NAME = ?
        ORDER BY ORDINAL_POSITION
        "#;

    /// Binds (schema, table) twice: once for STATISTICS, once for the
    /// constraint-name exclusion.
    pub const INDEXES: &str = r#"
        SELECT
            INDEX_NAME AS INDEX_NAME,
            COLUMN_NAME AS COLUMN_NAME,
            NON_UNIQUE AS NON_UNIQUE
        FROM INFORMATION_SCHEMA.STATISTICS
        WHERE TABLE_SCHEMA = ?
        AND TABLE_NAME = ?
        AND INDEX_NAME != 'PRIMARY'
        AND INDEX_NAME NOT IN (
            SELECT CONSTRAINT_NAME
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS
            WHERE TABLE_SCHEMA = ?
            AND TABLE_NAME = ?
            AND CONSTRAINT_TYPE IN ('UNIQUE', 'FOREIGN KEY')
        )
        ORDER BY INDEX_NAME, SEQ_IN_INDEX
        "#;
}

// =============================================================================
// Single-pass grouping
// =============================================================================

/// Return the last group if `same` accepts it, otherwise push a new one.
fn current_group<'a, T>(
    groups: &'a mut Vec<T>,
    same: impl Fn(&T) -> bool,
    open: impl FnOnce() -> T,
) -> &'a mut T {
    if groups.last().is_none_or(|g| !same(g)) {
        groups.push(open());
    }
    let last = groups.len() - 1;
    &mut groups[last]
}

/// Fold one `(constraint, column)` row into `keys`.
pub fn push_unique_key_row(keys: &mut Vec<UniqueKey>, constraint: &str, column: &str) {
    current_group(keys, |k| k.name == constraint, || UniqueKey::new(constraint))
        .columns
        .push(column.to_string());
}

/// Fold one `(constraint, column, referenced table, referenced column)` row
/// into `keys`.
pub fn push_foreign_key_row(
    keys: &mut Vec<ForeignKey>,
    constraint: &str,
    column: &str,
    referenced_table: &str,
    referenced_column: &str,
) {
    current_group(
        keys,
        |k| k.name == constraint,
        || ForeignKey::new(constraint, referenced_table),
    )
    .push_pair(column, referenced_column);
}

/// Fold one `(index, column, non_unique)` row into `indexes`.
pub fn push_index_row(indexes: &mut Vec<IndexInfo>, index: &str, column: &str, non_unique: bool) {
    current_group(
        indexes,
        |i| i.name == index,
        || IndexInfo::new(index, !non_unique),
    )
    .columns
    .push(column.to_string());
}

// =============================================================================
// MySQL implementation
// =============================================================================

/// [`SchemaRepository`] backed by a live MySQL pool.
#[derive(Debug, Clone)]
pub struct MySqlSchemaRepository {
    pool: MySqlPool,
}

impl MySqlSchemaRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// Safely get a string from a MySQL row.
/// Some server versions report INFORMATION_SCHEMA text as VARBINARY.
fn get_string(row: &MySqlRow, column: &str) -> String {
    row.try_get::<String, _>(column)
        .ok()
        .or_else(|| {
            row.try_get::<Vec<u8>, _>(column)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
        })
        .unwrap_or_default()
}

/// Safely get an optional string from a MySQL row. SQL NULL maps to `None`.
fn get_optional_string(row: &MySqlRow, column: &str) -> Option<String> {
    row.try_get::<Option<String>, _>(column)
        .ok()
        .flatten()
        .or_else(|| {
            row.try_get::<Option<Vec<u8>>, _>(column)
                .ok()
                .flatten()
                .and_then(|bytes| String::from_utf8(bytes).ok())
        })
}

/// Read an integer flag whatever width the server reports it with.
/// MySQL 5.x returns BIGINT, 8.x returns INT.
fn get_flag(row: &MySqlRow, column: &str) -> bool {
    if let Ok(v) = row.try_get::<i64, _>(column) {
        return v != 0;
    }
    if let Ok(v) = row.try_get::<u64, _>(column) {
        return v != 0;
    }
    if let Ok(v) = row.try_get::<i32, _>(column) {
        return v != 0;
    }
    row.try_get::<bool, _>(column).unwrap_or(true)
}

impl SchemaRepository for MySqlSchemaRepository {
    async fn fetch_table_comments(&self, database: &str) -> DbResult<Vec<TableSummary>> {
        let subject = FetchSubject::Tables;
        let mut rows = sqlx::query(queries::TABLE_COMMENTS)
            .bind(database)
            .fetch(&self.pool);

        let mut tables = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(|e| DbError::fetch(subject, e))? {
            let name = get_string(&row, "TABLE_NAME");
            if name.is_empty() {
                continue;
            }
            tables.push(TableSummary::new(name, get_string(&row, "TABLE_COMMENT")));
        }

        debug!(database = %database, count = tables.len(), "Listed MySQL tables");
        Ok(tables)
    }

    async fn fetch_primary_keys(&self, database: &str, table: &str) -> DbResult<Vec<String>> {
        let subject = FetchSubject::PrimaryKeys;
        let mut rows = sqlx::query(queries::PRIMARY_KEYS)
            .bind(database)
            .bind(table)
            .fetch(&self.pool);

        let mut columns = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(|e| DbError::fetch(subject, e))? {
            columns.push(get_string(&row, "COLUMN_NAME"));
        }

        debug!(table = %table, count = columns.len(), "Fetched primary key columns");
        Ok(columns)
    }

    async fn fetch_unique_keys(&self, database: &str, table: &str) -> DbResult<Vec<UniqueKey>> {
        let subject = FetchSubject::UniqueKeys;
        let mut rows = sqlx::query(queries::UNIQUE_KEYS)
            .bind(database)
            .bind(table)
            .fetch(&self.pool);

        let mut keys = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(|e| DbError::fetch(subject, e))? {
            push_unique_key_row(
                &mut keys,
                &get_string(&row, "CONSTRAINT_NAME"),
                &get_string(&row, "COLUMN_NAME"),
            );
        }

        debug!(table = %table, count = keys.len(), "Fetched unique keys");
        Ok(keys)
    }

    async fn fetch_foreign_keys(&self, database: &str, table: &str) -> DbResult<Vec<ForeignKey>> {
        let subject = FetchSubject::ForeignKeys;
        let mut rows = sqlx::query(queries::FOREIGN_KEYS)
            .bind(database)
            .bind(table)
            .fetch(&self.pool);

        let mut keys = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(|e| DbError::fetch(subject, e))? {
            push_foreign_key_row(
                &mut keys,
                &get_string(&row, "CONSTRAINT_NAME"),
                &get_string(&row, "COLUMN_NAME"),
                &get_string(&row, "REFERENCED_TABLE_NAME"),
                &get_string(&row, "REFERENCED_COLUMN_NAME"),
            );
        }

        debug!(table = %table, count = keys.len(), "Fetched foreign keys");
        Ok(keys)
    }

    async fn fetch_columns(&self, database: &str, table: &str) -> DbResult<Vec<ColumnInfo>> {
        let subject = FetchSubject::Columns;
        let mut rows = sqlx::query(queries::COLUMNS)
            .bind(database)
            .bind(table)
            .fetch(&self.pool);

        let mut columns = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(|e| DbError::fetch(subject, e))? {
            let nullable = get_string(&row, "IS_NULLABLE").eq_ignore_ascii_case("YES");
            columns.push(ColumnInfo {
                name: get_string(&row, "COLUMN_NAME"),
                data_type: get_string(&row, "COLUMN_TYPE"),
                nullable,
                default_value: get_optional_string(&row, "COLUMN_DEFAULT"),
                comment: get_string(&row, "COLUMN_COMMENT"),
            });
        }

        debug!(table = %table, count = columns.len(), "Fetched columns");
        Ok(columns)
    }

    async fn fetch_indexes(&self, database: &str, table: &str) -> DbResult<Vec<IndexInfo>> {
        let subject = FetchSubject::Indexes;
        let mut rows = sqlx::query(queries::INDEXES)
            .bind(database)
            .bind(table)
            .bind(database)
            .bind(table)
            .fetch(&self.pool);

        let mut indexes = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(|e| DbError::fetch(subject, e))? {
            push_index_row(
                &mut indexes,
                &get_string(&row, "INDEX_NAME"),
                &get_string(&row, "COLUMN_NAME"),
                get_flag(&row, "NON_UNIQUE"),
            );
        }

        debug!(table = %table, count = indexes.len(), "Fetched indexes");
        Ok(indexes)
    }
}
