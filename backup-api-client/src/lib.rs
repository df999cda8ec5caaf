//! Backup portal API client - token lifecycle, authenticated GETs,
//! paginated listings and payload guardrails

pub mod clock;
pub mod executor;
pub mod guardrail;
pub mod pagination;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use executor::{ApiExecutor, QueryParams};
pub use guardrail::{enforce, Guarded};
pub use pagination::{AggregatedResult, ListAggregator, ListOutcome, PageShape};
pub use token::{SharedTokenState, TokenManager};

use backup_mcp_shared::{ApiConfig, Credential, GatewayError, ListQuery, Result};
use reqwest::{Client, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Knobs for building a [`BackupApiClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub insecure_tls: bool,
    pub page_delay: Duration,
    pub clock: Arc<dyn Clock>,
    pub state: SharedTokenState,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            insecure_tls: false,
            page_delay: pagination::DEFAULT_PAGE_DELAY,
            clock: Arc::new(SystemClock),
            state: SharedTokenState::default(),
        }
    }
}

/// Main API client that wires the token manager, executor and aggregator
pub struct BackupApiClient {
    tokens: Arc<TokenManager>,
    executor: Arc<ApiExecutor>,
    aggregator: ListAggregator,
}

impl BackupApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Self::with_options(
            config.credential(),
            ClientOptions {
                insecure_tls: config.insecure_tls,
                page_delay: Duration::from_millis(config.page_delay_ms),
                ..ClientOptions::default()
            },
        )
    }

    pub fn with_options(credential: Credential, options: ClientOptions) -> Result<Self> {
        let http = build_http_client(options.insecure_tls)?;
        let base_url = credential.base_url.clone();

        let tokens = Arc::new(TokenManager::with_state(
            http.clone(),
            credential,
            options.state,
            options.clock,
        )?);
        let executor = Arc::new(ApiExecutor::new(http, &base_url, tokens.clone())?);
        let aggregator = ListAggregator::new(executor.clone(), options.page_delay);

        Ok(Self {
            tokens,
            executor,
            aggregator,
        })
    }

    /// Single authenticated GET
    pub async fn get(&self, path: &str, query: QueryParams<'_>) -> Result<Value> {
        self.executor.get(path, query).await
    }

    /// GET one resource of a collection by id
    pub async fn get_by_id(&self, collection: &str, id: &str) -> Result<Value> {
        let id = id.trim();
        if id.is_empty() || id == "." || id == ".." {
            return Err(GatewayError::Validation(format!(
                "'{id}' is not a valid resource id"
            )));
        }
        let url = self.executor.resource_url(collection, id)?;
        self.executor.get_url(url).await
    }

    /// Listing, aggregated across pages when `query.all` is set
    pub async fn get_list(&self, path: &str, query: &ListQuery) -> Result<ListOutcome> {
        self.aggregator.get_list(path, query).await
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn base_url(&self) -> &str {
        &self.tokens.credential().base_url
    }
}

fn build_http_client(insecure_tls: bool) -> Result<Client> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));

    if insecure_tls {
        tracing::warn!("TLS certificate verification is disabled for the portal connection");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().map_err(GatewayError::Network)
}

/// Response body as text; read failures yield an empty string
pub(crate) async fn response_text(response: Response) -> String {
    response.text().await.unwrap_or_default()
}
