#![allow(dead_code)]

use backup_api_client::{BackupApiClient, ClientOptions};
use backup_mcp_server::BackupMcpServer;
use backup_mcp_shared::{Credential, GatewayConfig};
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn gateway(server: &MockServer) -> BackupMcpServer {
    let mut config = GatewayConfig::default();
    config.api.base_url = server.uri();
    config.api.username = "admin".to_string();
    config.api.password = "pw".to_string();
    config.api.page_delay_ms = 0;

    let client = BackupApiClient::with_options(
        Credential::new(server.uri(), "admin", "pw"),
        ClientOptions {
            page_delay: Duration::ZERO,
            ..ClientOptions::default()
        },
    )
    .expect("client should build");

    BackupMcpServer::with_client(config, Arc::new(client))
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v3/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A",
            "refresh_token": "R",
            "expires_in": 3600
        })))
        .named("token")
        .mount(server)
        .await;
}

pub fn arguments(value: Value) -> Option<JsonObject> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Run a tool, failing the test on protocol-level errors
pub async fn call_tool(gateway: &BackupMcpServer, name: &str, args: Value) -> CallToolResult {
    gateway
        .call(name, arguments(args))
        .await
        .expect("tool call should not be a protocol error")
}

pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error == Some(true)
}

pub fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|content| content.as_text())
        .map(|text| text.text.clone())
        .expect("text content")
}

pub fn items(range: std::ops::Range<usize>) -> Vec<Value> {
    range.map(|i| json!({ "instanceUid": format!("uid-{i}") })).collect()
}
