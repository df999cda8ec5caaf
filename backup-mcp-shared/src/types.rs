//! Shared types for the backup portal gateway

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{GatewayError, Result};

/// Largest page size the portal accepts for a single listing request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Login credentials for one portal instance
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// OAuth2 token pair and its expiry
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Unix epoch milliseconds after which the access token is unusable
    pub expires_at_ms: i64,
}

impl TokenState {
    /// Whether the access token is usable for at least `margin_ms` more
    pub fn is_fresh(&self, now_ms: i64, margin_ms: i64) -> bool {
        self.access_token.is_some() && now_ms < self.expires_at_ms - margin_ms
    }
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &self.access_token.as_ref().map(|_| "<set>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<set>"))
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

/// Caller-supplied listing parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,
}

impl ListQuery {
    /// Check the bounds serde cannot express
    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.limit {
            if !(1..=MAX_PAGE_SIZE).contains(&limit) {
                return Err(GatewayError::Validation(format!(
                    "limit must be between 1 and {MAX_PAGE_SIZE}, got {limit}"
                )));
            }
        }
        Ok(())
    }

    pub fn wants_all(&self) -> bool {
        self.all.unwrap_or(false)
    }

    /// Query parameters for one request at the given offset and limit
    pub fn query_pairs(
        &self,
        offset: Option<u64>,
        limit: Option<u32>,
    ) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("offset", offset.map(|o| o.to_string())),
            ("limit", limit.map(|l| l.to_string())),
            ("filter", self.filter.clone()),
            ("sort", self.sort.clone()),
            ("search", self.search.clone()),
        ]
    }
}
