//! Schema-related data models.
//!
//! These records are built per request from `INFORMATION_SCHEMA` rows,
//! handed to the renderer and then dropped. Every list keeps the order the
//! server returned it in; nothing here sorts.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Full type expression (e.g., `varchar(255)`, `int unsigned`)
    pub data_type: String,
    pub nullable: bool,
    /// `None` when the server reports SQL NULL as the default
    pub default_value: Option<String>,
    /// Empty when the column has no comment
    pub comment: String,
}

impl ColumnInfo {
    /// Create a new column without default or comment.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default_value: None,
            comment: String::new(),
        }
    }

    /// Set the default value expression.
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Set the column comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// A UNIQUE constraint. Columns are in `ORDINAL_POSITION` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    pub name: String,
    pub columns: Vec<String>,
}

impl UniqueKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }
}

/// A FOREIGN KEY constraint.
///
/// `columns[i]` references `referenced_columns[i]`; both vectors always have
/// the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

impl ForeignKey {
    pub fn new(name: impl Into<String>, referenced_table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            referenced_table: referenced_table.into(),
            referenced_columns: Vec::new(),
        }
    }

    /// Append one referencing/referenced column pair.
    pub fn with_pair(mut self, column: impl Into<String>, referenced: impl Into<String>) -> Self {
        self.push_pair(column, referenced);
        self
    }

    pub fn push_pair(&mut self, column: impl Into<String>, referenced: impl Into<String>) {
        self.columns.push(column.into());
        self.referenced_columns.push(referenced.into());
    }
}

/// A secondary index that is neither the primary key nor backing a
/// UNIQUE / FOREIGN KEY constraint of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    /// In `SEQ_IN_INDEX` order
    pub columns: Vec<String>,
    pub is_unique: bool,
}

impl IndexInfo {
    pub fn new(name: impl Into<String>, is_unique: bool) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            is_unique,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }
}

/// One line of `list_tables` output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    /// Empty when the table has no comment
    pub comment: String,
    pub primary_key: Vec<String>,
    pub unique_keys: Vec<UniqueKey>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSummary {
    /// Create a summary with no key information attached yet.
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            ..Self::default()
        }
    }

    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_unique_key(mut self, key: UniqueKey) -> Self {
        self.unique_keys.push(key);
        self
    }

    pub fn with_foreign_key(mut self, key: ForeignKey) -> Self {
        self.foreign_keys.push(key);
        self
    }
}

/// Everything `describe_tables` renders for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDetail {
    pub name: String,
    pub comment: String,
    pub columns: Vec<ColumnInfo>,
    pub primary_key: Vec<String>,
    pub unique_keys: Vec<UniqueKey>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<IndexInfo>,
}

impl TableDetail {
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            ..Self::default()
        }
    }

    pub fn with_column(mut self, column: ColumnInfo) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_unique_key(mut self, key: UniqueKey) -> Self {
        self.unique_keys.push(key);
        self
    }

    pub fn with_foreign_key(mut self, key: ForeignKey) -> Self {
        self.foreign_keys.push(key);
        self
    }

    pub fn with_index(mut self, index: IndexInfo) -> Self {
        self.indexes.push(index);
        self
    }

}
