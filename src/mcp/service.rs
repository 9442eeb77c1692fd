//! MCP service implementation using rmcp.
//!
//! `ServerHandler` is implemented by hand rather than through the tool
//! macros: the advertised input schemas depend on the server mode, and
//! argument problems have to come back as tool-error results instead of
//! JSON-RPC errors.

use crate::config::ServerMode;
use crate::db::schema::SchemaRepository;
use crate::error::{DbError, DbResult};
use crate::mcp::definitions::{DESCRIBE_TABLES, LIST_TABLES, tool_definitions};
use crate::tools::schema::SchemaToolHandler;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::RequestContext,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SchemaService<R> {
    /// Tool handler shared by every request
    handler: SchemaToolHandler<R>,
    /// Built once for the active mode
    tools: Arc<Vec<Tool>>,
}

impl<R> Clone for SchemaService<R> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            tools: Arc::clone(&self.tools),
        }
    }
}

impl<R: SchemaRepository + 'static> SchemaService<R> {
    /// Create a new SchemaService instance.
    ///
    /// # Arguments
    ///
    /// * `repository` - Schema metadata source shared by all tool calls
    /// * `mode` - Per-request or fixed database selection
    pub fn new(repository: Arc<R>, mode: ServerMode) -> Self {
        let tools = Arc::new(tool_definitions(&mode));
        Self {
            handler: SchemaToolHandler::new(repository, mode),
            tools,
        }
    }

    pub fn mode(&self) -> &ServerMode {
        self.handler.mode()
    }

    /// The tool list advertised through `tools/list`.
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Run one tool call.
    ///
    /// Tool failures are returned as `Ok` results with `isError` set; only an
    /// unknown tool name is a protocol-level error.
    pub async fn dispatch(&self, name: &str, args: &JsonObject) -> Result<CallToolResult, McpError> {
        let outcome = match name {
            LIST_TABLES => self.handler.list_tables(args).await,
            DESCRIBE_TABLES => self.handler.describe_tables(args).await,
            _ => return Err(DbError::unknown_tool(name).into()),
        };
        Ok(into_tool_result(name, outcome))
    }

    fn instructions(&self) -> String {
        let selection = match self.mode() {
            ServerMode::PerRequest => {
                "Pass the target database in the `dbName` argument of every call.".to_string()
            }
            ServerMode::Fixed(database) => format!(
                "All calls run against the database \"{}\"; no `dbName` argument is taken.",
                database
            ),
        };

        format!(
            "Read-only MySQL schema introspection.\n\
            \n\
            ## Tools\n\
            - `list_tables`: one line per table with its comment and PK / UK / FK\n\
            - `describe_tables`: columns, keys and indexes for the tables named in `tableNames`\n\
            \n\
            ## Database selection\n\
            {}",
            selection
        )
    }
}

fn into_tool_result(tool: &str, outcome: DbResult<String>) -> CallToolResult {
    match outcome {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(err) => {
            warn!(tool = %tool, error = %err, "Tool call failed");
            CallToolResult::error(vec![Content::text(err.to_string())])
        }
    }
}

impl<R: SchemaRepository + 'static> ServerHandler for SchemaService<R> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mysql-schema-mcp".to_owned(),
                title: Some("MySQL Schema MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(self.instructions()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools.as_ref().clone()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name;
        let args = request.arguments.unwrap_or_default();
        info!(tool = %name, "Tool call");

        tokio::select! {
            result = self.dispatch(&name, &args) => result,
            _ = context.ct.cancelled() => Ok(into_tool_result(&name, Err(DbError::Cancelled))),
        }
    }
}
