//! Text rendering for schema tool output.
//!
//! Pure functions: same records in, same bytes out. Composite column lists are
//! wrapped in parentheses, and several constraints of one kind are joined
//! with `"; "`.

use crate::models::{ColumnInfo, ForeignKey, IndexInfo, TableDetail, TableSummary, UniqueKey};
use std::fmt::Write;

/// Body returned by `list_tables` when the database has no tables.
pub const NO_TABLES_MESSAGE: &str = "No tables exist in the database.";

/// Placed between two `describe_tables` blocks.
pub const TABLE_SEPARATOR: &str = "\n---\n\n";

const LIST_LEGEND: &str = "Format: Table Name - Table Comment [PK: Primary Key] [UK: Unique Key 1; Unique Key 2...] [FK: Foreign Key -> Referenced Table.Column; ...]\n\
* Composite keys (keys composed of multiple columns) are grouped in parentheses: (col1, col2)\n\
* Multiple different key constraints are separated by semicolons: key1; key2\n";

/// `c1` for one column, `(c1, c2, ...)` for more.
pub fn format_column_list<S: AsRef<str>>(columns: &[S]) -> String {
    let joined = columns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");

    if columns.len() > 1 {
        format!("({})", joined)
    } else {
        joined
    }
}

/// Render every item and join with `"; "`.
fn join_constraints<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    items.iter().map(render).collect::<Vec<_>>().join("; ")
}

pub fn format_primary_key(columns: &[String]) -> String {
    format_column_list(columns)
}

pub fn format_unique_keys(keys: &[UniqueKey]) -> String {
    join_constraints(keys, |k| format_column_list(&k.columns))
}

/// `<cols> -> <table>.<refCols>`, parenthesizing each side on its own.
pub fn format_foreign_keys(keys: &[ForeignKey]) -> String {
    join_constraints(keys, |k| {
        format!(
            "{} -> {}.{}",
            format_column_list(&k.columns),
            k.referenced_table,
            format_column_list(&k.referenced_columns)
        )
    })
}

pub fn format_indexes(indexes: &[IndexInfo]) -> String {
    join_constraints(indexes, |i| format_column_list(&i.columns))
}

/// `- name: type NULL|NOT NULL[ DEFAULT x][ [comment]]`
pub fn format_column(column: &ColumnInfo) -> String {
    let mut line = format!(
        "- {}: {} {}",
        column.name,
        column.data_type,
        if column.nullable { "NULL" } else { "NOT NULL" }
    );

    if let Some(default) = &column.default_value {
        let _ = write!(line, " DEFAULT {}", default);
    }
    if !column.comment.is_empty() {
        let _ = write!(line, " [{}]", column.comment);
    }

    line
}

/// Render the `list_tables` response for `database`.
pub fn render_table_list(database: &str, tables: &[TableSummary]) -> String {
    let mut output = format!(
        "Tables in database \"{}\" (Total: {})\n{}\n",
        database,
        tables.len(),
        LIST_LEGEND
    );

    for table in tables {
        let _ = write!(output, "- {} - {}", table.name, table.comment);
        if !table.primary_key.is_empty() {
            let _ = write!(output, " [PK: {}]", format_primary_key(&table.primary_key));
        }
        if !table.unique_keys.is_empty() {
            let _ = write!(output, " [UK: {}]", format_unique_keys(&table.unique_keys));
        }
        if !table.foreign_keys.is_empty() {
            let _ = write!(output, " [FK: {}]", format_foreign_keys(&table.foreign_keys));
        }
        output.push('\n');
    }

    output
}

/// Render one `describe_tables` block.
pub fn render_table_detail(table: &TableDetail) -> String {
    let mut output = format!("# Table: {}", table.name);
    if !table.comment.is_empty() {
        let _ = write!(output, " - {}", table.comment);
    }
    output.push_str("\n\n## Columns\n");

    for column in &table.columns {
        output.push_str(&format_column(column));
        output.push('\n');
    }

    output.push_str("\n## Key Information\n");
    if !table.primary_key.is_empty() {
        let _ = writeln!(output, "[PK: {}]", format_primary_key(&table.primary_key));
    }
    if !table.unique_keys.is_empty() {
        let _ = writeln!(output, "[UK: {}]", format_unique_keys(&table.unique_keys));
    }
    if !table.foreign_keys.is_empty() {
        let _ = writeln!(output, "[FK: {}]", format_foreign_keys(&table.foreign_keys));
    }
    if !table.indexes.is_empty() {
        let _ = writeln!(output, "[INDEX: {}]", format_indexes(&table.indexes));
    }

    output
}

/// Block emitted in place of a table that does not exist.
pub fn render_table_not_found(name: &str) -> String {
    format!("# Table: {}\nTable not found\n", name)
}
