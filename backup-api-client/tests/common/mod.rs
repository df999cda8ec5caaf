#![allow(dead_code)]

use backup_api_client::{BackupApiClient, ClientOptions, ManualClock, SharedTokenState};
use backup_mcp_shared::{Credential, TokenState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/api/v3/token";

pub fn client(server: &MockServer, clock: Arc<ManualClock>, state: SharedTokenState) -> BackupApiClient {
    BackupApiClient::with_options(
        Credential::new(server.uri(), "admin", "pw"),
        ClientOptions {
            page_delay: Duration::ZERO,
            clock,
            state,
            ..ClientOptions::default()
        },
    )
    .expect("client should build")
}

/// State holding a valid token pair until `expires_at_ms`
pub fn seeded_state(access: &str, refresh: Option<&str>, expires_at_ms: i64) -> SharedTokenState {
    Arc::new(RwLock::new(TokenState {
        access_token: Some(access.to_string()),
        refresh_token: refresh.map(str::to_string),
        expires_at_ms,
    }))
}

pub fn token_body(access: &str, refresh: Option<&str>, expires_in: Option<i64>) -> Value {
    let mut body = json!({ "access_token": access, "token_type": "bearer" });
    if let Some(refresh) = refresh {
        body["refresh_token"] = json!(refresh);
    }
    if let Some(expires_in) = expires_in {
        body["expires_in"] = json!(expires_in);
    }
    body
}

pub async fn mount_login(server: &MockServer, response: ResponseTemplate, expected: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=admin"))
        .respond_with(response)
        .expect(expected)
        .named("password grant")
        .mount(server)
        .await;
}

pub async fn mount_refresh(server: &MockServer, refresh_token: &str, response: ResponseTemplate, expected: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains(format!("refresh_token={refresh_token}")))
        .respond_with(response)
        .expect(expected)
        .named("refresh grant")
        .mount(server)
        .await;
}

pub fn items(range: std::ops::Range<usize>) -> Vec<Value> {
    range.map(|i| json!({ "id": i })).collect()
}
