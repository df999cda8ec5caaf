//! MCP server handler for the backup portal gateway

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use tracing::{debug, info, warn};

use backup_api_client::BackupApiClient;
use backup_mcp_shared::{GatewayConfig, GatewayError, Result};

use crate::tools::ToolProvider;

const INSTRUCTIONS: &str = "Read-only access to the backup portal: companies, backup servers, \
jobs, repositories, protected workloads, alarms and licensing. List tools accept \
offset/limit/filter/sort/search; set all=true to collect up to 1000 items across pages.";

#[derive(Clone)]
pub struct BackupMcpServer {
    config: Arc<GatewayConfig>,
    tool_provider: Arc<ToolProvider>,
}

impl BackupMcpServer {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        info!("Initializing backup portal MCP server for {}", config.api.base_url);
        let client = Arc::new(BackupApiClient::new(&config.api)?);
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: GatewayConfig, client: Arc<BackupApiClient>) -> Self {
        let tool_provider = Arc::new(ToolProvider::new(client, config.clone()));
        Self {
            config: Arc::new(config),
            tool_provider,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn tool_provider(&self) -> &ToolProvider {
        &self.tool_provider
    }

    /// Run a tool. Unknown tools are a protocol error; every other failure
    /// comes back as an `isError` result the model can read.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> std::result::Result<CallToolResult, McpError> {
        match self.tool_provider.call_tool(name, arguments).await {
            Ok(content) => {
                debug!("Successfully called tool: {}", name);
                Ok(CallToolResult::success(content))
            }
            Err(GatewayError::ToolNotFound(name)) => Err(McpError::invalid_params(
                format!("Unknown tool: {name}"),
                None,
            )),
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }
}

impl ServerHandler for BackupMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info.name = env!("CARGO_PKG_NAME").to_string();
        info.server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info.instructions = Some(INSTRUCTIONS.to_string());
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tool_provider.list_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!("Calling tool: {}", request.name);
        self.call(&request.name, request.arguments).await
    }
}
