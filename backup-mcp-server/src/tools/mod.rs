//! Tool provider for the backup portal MCP gateway

use std::sync::Arc;

use backup_api_client::{enforce, BackupApiClient};
use backup_mcp_shared::{GatewayConfig, GatewayError, ListQuery, Result};
use rmcp::model::{Content, JsonObject, Tool};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

pub mod catalog;

use catalog::{ToolKind, CATALOG};

pub const STATUS_TOOL: &str = "gateway_status";

/// Arguments of resource-by-id tools
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdArgs {
    pub id: String,
}

/// Arguments of tools that take none
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

pub struct ToolProvider {
    client: Arc<BackupApiClient>,
    config: GatewayConfig,
}

impl ToolProvider {
    pub fn new(client: Arc<BackupApiClient>, config: GatewayConfig) -> Self {
        Self { client, config }
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = CATALOG
            .iter()
            .map(|entry| Tool::new(entry.name, entry.description, entry.input_schema()))
            .collect();

        tools.push(Tool::new(
            STATUS_TOOL,
            "Report gateway configuration and authentication state",
            catalog::empty_schema(),
        ));

        debug!("Listed {} tools", tools.len());
        tools
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<Vec<Content>> {
        debug!("Calling tool: {}", name);

        if name == STATUS_TOOL {
            parse_args::<NoArgs>(arguments)?;
            return self.gateway_status().await;
        }

        let Some(entry) = catalog::find(name) else {
            error!("Unknown tool: {}", name);
            return Err(GatewayError::ToolNotFound(name.to_string()));
        };

        let (payload, note) = match entry.kind {
            ToolKind::Info { path } => {
                parse_args::<NoArgs>(arguments)?;
                (self.client.get(path, &[]).await?, None)
            }
            ToolKind::List { path } => {
                let query: ListQuery = parse_args(arguments)?;
                query.validate()?;
                let outcome = self.client.get_list(path, &query).await?;
                let note = outcome.note();
                (outcome.into_value(), note)
            }
            ToolKind::Get { collection } => {
                let args: IdArgs = parse_args(arguments)?;
                (self.client.get_by_id(collection, &args.id).await?, None)
            }
        };

        Ok(vec![Content::text(render(payload, note)?)])
    }

    async fn gateway_status(&self) -> Result<Vec<Content>> {
        let status = json!({
            "server": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "transport": self.config.transport.kind,
            },
            "api": {
                "base_url": self.client.base_url(),
                "username": self.config.api.username,
                "insecure_tls": self.config.api.insecure_tls,
                "authenticated": self.client.tokens().access_token().await.is_some(),
            },
            "tools": CATALOG.len() + 1,
        });

        Ok(vec![Content::text(serde_json::to_string_pretty(&status)?)])
    }
}

/// Decode tool arguments, treating absent arguments as `{}`
pub fn parse_args<T: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<T> {
    let value = Value::Object(arguments.unwrap_or_default());
    serde_json::from_value(value).map_err(|e| GatewayError::Validation(e.to_string()))
}

/// Apply the payload guardrail and format the text block
pub fn render(payload: Value, list_note: Option<String>) -> Result<String> {
    let guarded = enforce(payload);

    let notes: Vec<String> = list_note
        .into_iter()
        .chain(guarded.note.map(str::to_string))
        .collect();
    let body = serde_json::to_string_pretty(&guarded.payload)?;

    if notes.is_empty() {
        Ok(body)
    } else {
        Ok(format!("NOTE: {}\n{}", notes.join(" "), body))
    }
}
