//! Authenticated request executor - issues portal GETs with bearer tokens

use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use backup_mcp_shared::{GatewayError, Result};

use crate::response_text;
use crate::token::TokenManager;

/// Query parameters for one request; `None` and empty values are skipped
pub type QueryParams<'a> = &'a [(&'a str, Option<String>)];

pub struct ApiExecutor {
    http: Client,
    base_url: Url,
    tokens: Arc<TokenManager>,
}

impl ApiExecutor {
    pub fn new(http: Client, base_url: &str, tokens: Arc<TokenManager>) -> Result<Self> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            tokens,
        })
    }

    /// Resolve `path` against the base URL and attach the present parameters
    pub fn build_url(&self, path: &str, query: QueryParams<'_>) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        append_query(&mut url, query);
        Ok(url)
    }

    /// URL of one resource inside a collection, with `id` as a single
    /// percent-encoded path segment
    pub fn resource_url(&self, collection: &str, id: &str) -> Result<Url> {
        let mut url = self.base_url.join(collection)?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Config(format!("base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// GET `path` and return the decoded JSON body
    pub async fn get(&self, path: &str, query: QueryParams<'_>) -> Result<Value> {
        let url = self.build_url(path, query)?;
        self.get_url(url).await
    }

    /// GET an already-built URL
    ///
    /// A 401 gets exactly one refresh-and-retry; every other failure is
    /// returned as [`GatewayError::Upstream`].
    pub async fn get_url(&self, url: Url) -> Result<Value> {
        self.tokens.ensure_valid().await?;

        let mut response = self.send(&url).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("GET {} returned 401, refreshing token once", url.path());

            if self.tokens.has_refresh_token().await {
                self.tokens.refresh().await;
            }
            if self.tokens.access_token().await.is_some() {
                response = self.send(&url).await?;
            }
        }

        let status = response.status();
        if !status.is_success() {
            let body = response_text(response).await;
            tracing::error!("GET {} failed with status {}", url.path(), status);
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse response from {} as JSON: {}", url.path(), e);
            GatewayError::Json(e)
        })
    }

    async fn send(&self, url: &Url) -> Result<Response> {
        let token = self
            .tokens
            .access_token()
            .await
            .ok_or_else(|| GatewayError::Authentication {
                status: StatusCode::UNAUTHORIZED.as_u16(),
                body: "no access token available".to_string(),
            })?;

        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url.clone())
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        Ok(response)
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }
}

fn append_query(url: &mut Url, query: QueryParams<'_>) {
    let present: Vec<(&str, &str)> = query
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (*key, v))
        })
        .collect();

    if present.is_empty() {
        return;
    }

    let mut pairs = url.query_pairs_mut();
    for (key, value) in present {
        pairs.append_pair(key, value);
    }
}
