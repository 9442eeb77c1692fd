//! Tool definitions advertised through `tools/list`.
//!
//! Input schemas are generated from the argument structs and reshaped for the
//! active [`ServerMode`]: fixed mode drops the `dbName` property.

use crate::config::ServerMode;
use crate::tools::schema::{DB_NAME_ARG, DescribeTablesInput, ListTablesInput};
use rmcp::model::{JsonObject, Tool, ToolAnnotations};
use schemars::JsonSchema;
use serde_json::Value;
use std::sync::Arc;

pub const LIST_TABLES: &str = "list_tables";
pub const DESCRIBE_TABLES: &str = "describe_tables";

const LIST_TABLES_DESCRIPTION: &str =
    "Returns a list of table information in the MySQL database.";
const DESCRIBE_TABLES_DESCRIPTION: &str =
    "Returns detailed information for the specified tables.";

/// Both tools, in the order they are listed.
pub fn tool_definitions(mode: &ServerMode) -> Vec<Tool> {
    vec![
        read_only_tool(
            LIST_TABLES,
            LIST_TABLES_DESCRIPTION,
            input_schema::<ListTablesInput>(mode),
        ),
        read_only_tool(
            DESCRIBE_TABLES,
            DESCRIBE_TABLES_DESCRIPTION,
            input_schema::<DescribeTablesInput>(mode),
        ),
    ]
}

fn read_only_tool(name: &'static str, description: &'static str, schema: JsonObject) -> Tool {
    let mut tool = Tool::new(name, description, Arc::new(schema));
    tool.annotations = Some(ToolAnnotations {
        read_only_hint: Some(true),
        destructive_hint: Some(false),
        ..Default::default()
    });
    tool
}

/// JSON Schema object for `T`, without `$schema` / `title`, and without
/// `dbName` in fixed mode.
pub fn input_schema<T: JsonSchema>(mode: &ServerMode) -> JsonObject {
    let schema = schemars::schema_for!(T);
    let mut object = match serde_json::to_value(&schema) {
        Ok(Value::Object(map)) => map,
        _ => JsonObject::new(),
    };

    object.remove("$schema");
    object.remove("title");
    object
        .entry("type")
        .or_insert_with(|| Value::String("object".to_string()));

    if mode.is_fixed() {
        remove_property(&mut object, DB_NAME_ARG);
    }

    object
}

fn remove_property(schema: &mut JsonObject, name: &str) {
    if let Some(Value::Object(properties)) = schema.get_mut("properties") {
        properties.remove(name);
    }

    let now_empty = match schema.get_mut("required") {
        Some(Value::Array(required)) => {
            required.retain(|v| v.as_str() != Some(name));
            required.is_empty()
        }
        _ => false,
    };
    if now_empty {
        schema.remove("required");
    }
}
