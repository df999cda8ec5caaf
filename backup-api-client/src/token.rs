//! OAuth2 token lifecycle for a single portal credential
//!
//! The manager holds one access/refresh token pair. `ensure_valid` reuses the
//! access token while it has more than [`EXPIRY_MARGIN_MS`] left, otherwise it
//! tries the refresh grant and finally the password grant.
//!
//! Concurrent callers are not coordinated: the state lock is only held to read
//! or write the token pair, never across a network call, so two tasks that
//! both see a stale token will both re-authenticate. The token endpoint treats
//! repeated grants as independent, so the last writer simply wins.

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use backup_mcp_shared::{Credential, GatewayError, Result, TokenState};

use crate::clock::{Clock, SystemClock};
use crate::response_text;

/// Token endpoint, resolved against the portal base URL
pub const TOKEN_PATH: &str = "/api/v3/token";

/// Tokens this close to expiry are treated as already expired
pub const EXPIRY_MARGIN_MS: i64 = 30_000;

/// Lifetime assumed when the server does not report a usable `expires_in`
pub const FALLBACK_LIFETIME_SECS: f64 = 600.0;

/// Reported lifetimes are capped at one year
pub const MAX_LIFETIME_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// Token state shared between a manager and anything observing it
pub type SharedTokenState = Arc<RwLock<TokenState>>;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<Value>,
}

pub struct TokenManager {
    http: Client,
    credential: Credential,
    token_url: Url,
    state: SharedTokenState,
    clock: Arc<dyn Clock>,
}

impl TokenManager {
    pub fn new(http: Client, credential: Credential) -> Result<Self> {
        Self::with_state(
            http,
            credential,
            SharedTokenState::default(),
            Arc::new(SystemClock),
        )
    }

    /// Build a manager around an existing state object and clock
    pub fn with_state(
        http: Client,
        credential: Credential,
        state: SharedTokenState,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let token_url = Url::parse(&credential.base_url)?.join(TOKEN_PATH)?;

        Ok(Self {
            http,
            credential,
            token_url,
            state,
            clock,
        })
    }

    /// Make sure a usable access token is held
    pub async fn ensure_valid(&self) -> Result<()> {
        let now = self.clock.now_ms();
        let (fresh, can_refresh) = {
            let state = self.state.read().await;
            (
                state.is_fresh(now, EXPIRY_MARGIN_MS),
                state.refresh_token.is_some(),
            )
        };

        if fresh {
            return Ok(());
        }

        if can_refresh && self.refresh().await {
            return Ok(());
        }

        self.login().await
    }

    /// Exchange the username and password for a new token pair
    pub async fn login(&self) -> Result<()> {
        debug!(
            "Requesting password grant for {} at {}",
            self.credential.username, self.token_url
        );

        let response = self
            .http
            .post(self.token_url.clone())
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", "password"),
                ("username", self.credential.username.as_str()),
                ("password", self.credential.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response_text(response).await;

        if !status.is_success() {
            warn!("Login rejected with status {}", status);
            return Err(GatewayError::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        if !self.store(token).await {
            return Err(GatewayError::Authentication {
                status: status.as_u16(),
                body: "token response did not contain an access_token".to_string(),
            });
        }

        info!("Authenticated as {}", self.credential.username);
        Ok(())
    }

    /// Exchange the held refresh token for a new token pair
    ///
    /// Returns `false` instead of failing: a rejected refresh is recovered by
    /// logging in again.
    pub async fn refresh(&self) -> bool {
        let Some(refresh_token) = self.state.read().await.refresh_token.clone() else {
            return false;
        };

        match self.request_refresh(&refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                false
            }
        }
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<bool> {
        debug!("Requesting refresh grant at {}", self.token_url);

        let response = self
            .http
            .post(self.token_url.clone())
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response_text(response).await;

        if !status.is_success() {
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok(self.store(token).await)
    }

    /// Record a successful grant; false when it carried no access token
    async fn store(&self, token: TokenResponse) -> bool {
        let Some(access_token) = token.access_token.filter(|t| !t.is_empty()) else {
            return false;
        };

        let lifetime = lifetime_ms(lifetime_secs(token.expires_in.as_ref()));
        let expires_at_ms = self.clock.now_ms().saturating_add(lifetime);

        let mut state = self.state.write().await;
        state.access_token = Some(access_token);
        if let Some(refresh_token) = token.refresh_token.filter(|t| !t.is_empty()) {
            state.refresh_token = Some(refresh_token);
        }
        state.expires_at_ms = expires_at_ms;
        true
    }

    /// Drop the access token so the next call re-authenticates
    pub async fn invalidate(&self) {
        self.state.write().await.access_token = None;
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    pub async fn has_refresh_token(&self) -> bool {
        self.state.read().await.refresh_token.is_some()
    }

    pub async fn snapshot(&self) -> TokenState {
        self.state.read().await.clone()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn state(&self) -> &SharedTokenState {
        &self.state
    }
}

/// Server-reported lifetime in seconds, or the fallback
fn lifetime_secs(expires_in: Option<&Value>) -> f64 {
    let reported = match expires_in {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match reported {
        Some(secs) if secs.is_finite() && secs > 0.0 => secs,
        _ => FALLBACK_LIFETIME_SECS,
    }
}

/// Whole milliseconds, rounded up so a fresh token never expires at `now`
fn lifetime_ms(secs: f64) -> i64 {
    let ms = (secs * 1000.0).ceil();
    if ms >= MAX_LIFETIME_MS as f64 {
        MAX_LIFETIME_MS
    } else {
        (ms as i64).max(1)
    }
}
