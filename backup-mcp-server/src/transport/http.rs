//! Streamable HTTP transport on `/mcp`, plus a health check

use axum::routing::get;
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::StreamableHttpService;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use backup_mcp_shared::Result;

use crate::server::BackupMcpServer;

/// Every session gets its own handler clone; clones share the API client
pub fn router(server: BackupMcpServer) -> Router {
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    Router::new()
        .nest_service("/mcp", mcp)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(server: BackupMcpServer, host: &str, port: u16) -> Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    info!("Serving MCP over http on {}/mcp", listener.local_addr()?);
    serve(listener, server).await
}

pub async fn serve(listener: TcpListener, server: BackupMcpServer) -> Result<()> {
    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down http transport"),
        // No signal handler available; run until the process is killed
        Err(_) => std::future::pending::<()>().await,
    }
}
