//! Newline-delimited JSON-RPC over stdin/stdout

use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tracing::{error, info};

use backup_mcp_shared::{GatewayError, Result};

use crate::server::BackupMcpServer;

/// Serve one MCP session on stdin/stdout until the client disconnects
pub async fn run(server: BackupMcpServer) -> Result<()> {
    info!("Serving MCP over stdio");

    let service = server.serve(stdio()).await.map_err(|e| {
        error!("MCP session failed to initialize: {}", e);
        GatewayError::Protocol(format!("stdio session failed to initialize: {e}"))
    })?;

    let reason = service
        .waiting()
        .await
        .map_err(|e| GatewayError::Protocol(format!("stdio session task failed: {e}")))?;
    info!("stdio session ended: {:?}", reason);
    Ok(())
}
