//! Shared fixtures for integration tests.
//!
//! `FixtureRepository` serves the same four-table schema as
//! `testdata/schema.sql` from memory, so tool and protocol tests run without a
//! MySQL server.

#![allow(dead_code)]

use mysql_schema_mcp::db::SchemaRepository;
use mysql_schema_mcp::error::{DbError, DbResult, FetchSubject};
use mysql_schema_mcp::models::{
    ColumnInfo, ForeignKey, IndexInfo, TableDetail, TableSummary, UniqueKey,
};
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::Value;
use std::collections::HashMap;

pub const TEST_DB: &str = "test_mysql_schema_explorer_mcp";

pub struct FixtureRepository {
    databases: HashMap<String, Vec<TableDetail>>,
    failing: Option<FetchSubject>,
}

impl FixtureRepository {
    /// The seeded test database plus an empty one named `empty_db`.
    pub fn seeded() -> Self {
        let mut databases = HashMap::new();
        databases.insert(TEST_DB.to_string(), seeded_tables());
        databases.insert("empty_db".to_string(), Vec::new());
        Self {
            databases,
            failing: None,
        }
    }

    /// Make every query for `subject` fail.
    pub fn failing_on(mut self, subject: FetchSubject) -> Self {
        self.failing = Some(subject);
        self
    }

    fn check(&self, subject: FetchSubject) -> DbResult<()> {
        match self.failing {
            Some(failing) if failing == subject => Err(DbError::fetch(
                subject,
                sqlx::Error::Protocol("connection lost".to_string()),
            )),
            _ => Ok(()),
        }
    }

    fn table(&self, database: &str, table: &str) -> Option<&TableDetail> {
        self.databases
            .get(database)
            .and_then(|tables| tables.iter().find(|t| t.name == table))
    }
}

impl SchemaRepository for FixtureRepository {
    async fn fetch_table_comments(&self, database: &str) -> DbResult<Vec<TableSummary>> {
        self.check(FetchSubject::Tables)?;
        let mut tables: Vec<TableSummary> = self
            .databases
            .get(database)
            .map(|tables| {
                tables
                    .iter()
                    .map(|t| TableSummary::new(t.name.clone(), t.comment.clone()))
                    .collect()
            })
            .unwrap_or_default();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tables)
    }

    async fn fetch_primary_keys(&self, database: &str, table: &str) -> DbResult<Vec<String>> {
        self.check(FetchSubject::PrimaryKeys)?;
        Ok(self
            .table(database, table)
            .map(|t| t.primary_key.clone())
            .unwrap_or_default())
    }

    async fn fetch_unique_keys(&self, database: &str, table: &str) -> DbResult<Vec<UniqueKey>> {
        self.check(FetchSubject::UniqueKeys)?;
        Ok(self
            .table(database, table)
            .map(|t| t.unique_keys.clone())
            .unwrap_or_default())
    }

    async fn fetch_foreign_keys(&self, database: &str, table: &str) -> DbResult<Vec<ForeignKey>> {
        self.check(FetchSubject::ForeignKeys)?;
        Ok(self
            .table(database, table)
            .map(|t| t.foreign_keys.clone())
            .unwrap_or_default())
    }

    async fn fetch_columns(&self, database: &str, table: &str) -> DbResult<Vec<ColumnInfo>> {
        self.check(FetchSubject::Columns)?;
        Ok(self
            .table(database, table)
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn fetch_indexes(&self, database: &str, table: &str) -> DbResult<Vec<IndexInfo>> {
        self.check(FetchSubject::Indexes)?;
        Ok(self
            .table(database, table)
            .map(|t| t.indexes.clone())
            .unwrap_or_default())
    }
}

fn seeded_tables() -> Vec<TableDetail> {
    let users = TableDetail::new("users", "User information")
        .with_column(ColumnInfo::new("id", "int", false).with_comment("User system ID"))
        .with_column(ColumnInfo::new("email", "varchar(255)", false).with_comment("Email address"))
        .with_column(ColumnInfo::new("username", "varchar(255)", false).with_comment("Username"))
        .with_column(ColumnInfo::new("tenant_id", "int", false).with_comment("Tenant ID"))
        .with_column(ColumnInfo::new("employee_id", "int", false).with_comment("Employee ID"))
        .with_primary_key(["id"])
        .with_unique_key(UniqueKey::new("email").with_column("email"))
        .with_unique_key(
            UniqueKey::new("idx_tenant_employee")
                .with_column("tenant_id")
                .with_column("employee_id"),
        )
        .with_unique_key(UniqueKey::new("username").with_column("username"));

    let orders = TableDetail::new("orders", "Order header")
        .with_column(ColumnInfo::new("id", "int", false).with_comment("Order ID"))
        .with_column(ColumnInfo::new("user_id", "int", false).with_comment("User ID (FK)"))
        .with_column(
            ColumnInfo::new("status", "varchar(20)", false)
                .with_default("pending")
                .with_comment("Order status"),
        )
        .with_column(ColumnInfo::new("note", "text", true))
        .with_primary_key(["id"])
        .with_foreign_key(ForeignKey::new("fk_orders_users", "users").with_pair("user_id", "id"));

    let products = TableDetail::new("products", "Product master")
        .with_column(
            ColumnInfo::new("product_code", "varchar(50)", false)
                .with_comment("Product code (Primary Key)"),
        )
        .with_column(ColumnInfo::new("maker_code", "varchar(50)", false).with_comment("Maker code"))
        .with_column(
            ColumnInfo::new("internal_code", "varchar(50)", false)
                .with_comment("Internal product code"),
        )
        .with_column(ColumnInfo::new("product_name", "varchar(255)", true).with_comment("Product name"))
        .with_primary_key(["product_code"])
        .with_unique_key(
            UniqueKey::new("uk_maker_internal")
                .with_column("maker_code")
                .with_column("internal_code"),
        )
        .with_index(
            IndexInfo::new("idx_maker_product_name", false)
                .with_column("maker_code")
                .with_column("product_name"),
        )
        .with_index(IndexInfo::new("idx_product_name", false).with_column("product_name"));

    let order_items = TableDetail::new("order_items", "Order details")
        .with_column(ColumnInfo::new("order_id", "int", false).with_comment("Order ID (FK)"))
        .with_column(
            ColumnInfo::new("item_seq", "int", false).with_comment("Order item sequence number"),
        )
        .with_column(
            ColumnInfo::new("product_maker", "varchar(50)", false)
                .with_comment("Product maker code (FK)"),
        )
        .with_column(
            ColumnInfo::new("product_internal_code", "varchar(50)", false)
                .with_comment("Product internal code (FK)"),
        )
        .with_column(ColumnInfo::new("quantity", "int", false).with_comment("Quantity"))
        .with_primary_key(["order_id", "item_seq"])
        .with_unique_key(
            UniqueKey::new("uk_order_product")
                .with_column("order_id")
                .with_column("product_maker")
                .with_column("product_internal_code"),
        )
        .with_foreign_key(
            ForeignKey::new("fk_order_items_order", "orders").with_pair("order_id", "id"),
        )
        .with_foreign_key(
            ForeignKey::new("fk_order_items_product", "products")
                .with_pair("product_maker", "maker_code")
                .with_pair("product_internal_code", "internal_code"),
        )
        .with_index(
            IndexInfo::new("idx_product", false)
                .with_column("product_maker")
                .with_column("product_internal_code"),
        );

    vec![users, orders, products, order_items]
}

/// Build a tool argument object from a JSON literal.
pub fn args(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Text of the single content item and the `isError` flag.
pub fn text_of(result: &CallToolResult) -> (String, bool) {
    let value = serde_json::to_value(result).expect("serialize tool result");
    let text = value["content"][0]["text"]
        .as_str()
        .expect("text content")
        .to_string();
    let is_error = value["isError"].as_bool().unwrap_or(false);
    (text, is_error)
}

pub const EXPECTED_LIST_TABLES: &str = r#"Tables in database "test_mysql_schema_explorer_mcp" (Total: 4)
Format: Table Name - Table Comment [PK: Primary Key] [UK: Unique Key 1; Unique Key 2...] [FK: Foreign Key -> Referenced Table.Column; ...]
* Composite keys (keys composed of multiple columns) are grouped in parentheses: (col1, col2)
* Multiple different key constraints are separated by semicolons: key1; key2

- order_items - Order details [PK: (order_id, item_seq)] [UK: (order_id, product_maker, product_internal_code)] [FK: order_id -> orders.id; (product_maker, product_internal_code) -> products.(maker_code, internal_code)]
- orders - Order header [PK: id] [FK: user_id -> users.id]
- products - Product master [PK: product_code] [UK: (maker_code, internal_code)]
- users - User information [PK: id] [UK: email; (tenant_id, employee_id); username]
"#;

pub const EXPECTED_DESCRIBE_TABLES: &str = r#"# Table: users - User information

## Columns
- id: int NOT NULL [User system ID]
- email: varchar(255) NOT NULL [Email address]
- username: varchar(255) NOT NULL [Username]
- tenant_id: int NOT NULL [Tenant ID]
- employee_id: int NOT NULL [Employee ID]

## Key Information
[PK: id]
[UK: email; (tenant_id, employee_id); username]

---

# Table: products - Product master

## Columns
- product_code: varchar(50) NOT NULL [Product code (Primary Key)]
- maker_code: varchar(50) NOT NULL [Maker code]
- internal_code: varchar(50) NOT NULL [Internal product code]
- product_name: varchar(255) NULL [Product name]

## Key Information
[PK: product_code]
[UK: (maker_code, internal_code)]
[INDEX: (maker_code, product_name); product_name]

---

# Table: order_items - Order details

## Columns
- order_id: int NOT NULL [Order ID (FK)]
- item_seq: int NOT NULL [Order item sequence number]
- product_maker: varchar(50) NOT NULL [Product maker code (FK)]
- product_internal_code: varchar(50) NOT NULL [Product internal code (FK)]
- quantity: int NOT NULL [Quantity]

## Key Information
[PK: (order_id, item_seq)]
[UK: (order_id, product_maker, product_internal_code)]
[FK: order_id -> orders.id; (product_maker, product_internal_code) -> products.(maker_code, internal_code)]
[INDEX: (product_maker, product_internal_code)]
"#;
