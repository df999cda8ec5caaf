//! Configuration management for the backup portal MCP gateway
//!
//! Everything is read once from the process environment at startup and then
//! treated as immutable. Command-line flags may override individual values
//! before the config is frozen.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::Credential;
use crate::{GatewayError, Result};

pub const ENV_API_URL: &str = "BACKUP_API_URL";
pub const ENV_API_USERNAME: &str = "BACKUP_API_USERNAME";
pub const ENV_API_PASSWORD: &str = "BACKUP_API_PASSWORD";
pub const ENV_API_INSECURE_TLS: &str = "BACKUP_API_INSECURE_TLS";
pub const ENV_PAGE_DELAY_MS: &str = "BACKUP_API_PAGE_DELAY_MS";
pub const ENV_TRANSPORT: &str = "MCP_TRANSPORT";
pub const ENV_HTTP_HOST: &str = "MCP_HTTP_HOST";
pub const ENV_HTTP_PORT: &str = "MCP_HTTP_PORT";
pub const ENV_PORT: &str = "PORT";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Main configuration for the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Remote API connection
    pub api: ApiConfig,

    /// Inbound MCP transport
    pub transport: TransportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Remote API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the portal, e.g. https://portal.example.com:1280
    pub base_url: String,

    pub username: String,

    pub password: String,

    /// Accept self-signed certificates
    pub insecure_tls: bool,

    /// Pause between pages of an aggregated listing (milliseconds)
    pub page_delay_ms: u64,
}

/// Transport selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Stdio,
    Http,
}

/// Inbound transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    pub kind: TransportKind,

    /// Listen address for the http transport
    pub host: String,

    /// Listen port for the http transport
    pub port: u16,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is unset (trace, debug, info, warn, error)
    pub level: String,

    pub format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            insecure_tls: false,
            page_delay_ms: 50,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Stdio,
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" | "sse" => Ok(Self::Http),
            other => Err(format!("unknown transport '{other}' (expected stdio or http)")),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected pretty or json)")),
        }
    }
}

impl ApiConfig {
    pub fn credential(&self) -> Credential {
        Credential::new(&self.base_url, &self.username, &self.password)
    }
}

impl GatewayConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config.api.base_url = url;
        }
        if let Some(username) = get(ENV_API_USERNAME) {
            config.api.username = username;
        }
        // Passwords may legitimately carry surrounding whitespace
        if let Some(password) = lookup(ENV_API_PASSWORD).filter(|v| !v.is_empty()) {
            config.api.password = password;
        }
        if let Some(flag) = get(ENV_API_INSECURE_TLS) {
            config.api.insecure_tls = parse_flag(&flag);
        }
        if let Some(delay) = get(ENV_PAGE_DELAY_MS) {
            config.api.page_delay_ms = delay.parse().map_err(|_| {
                GatewayError::Config(format!("{ENV_PAGE_DELAY_MS} must be an integer, got '{delay}'"))
            })?;
        }

        if let Some(kind) = get(ENV_TRANSPORT) {
            config.transport.kind = kind.parse().map_err(GatewayError::Config)?;
        }
        if let Some(host) = get(ENV_HTTP_HOST) {
            config.transport.host = host;
        }
        if let Some(port) = get(ENV_HTTP_PORT).or_else(|| get(ENV_PORT)) {
            config.transport.port = port.parse().map_err(|_| {
                GatewayError::Config(format!("invalid listen port '{port}'"))
            })?;
        }

        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
        if let Some(format) = get(ENV_LOG_FORMAT) {
            config.logging.format = format.parse().map_err(GatewayError::Config)?;
        }

        Ok(config)
    }

    /// Reject configurations the gateway cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(GatewayError::Config(format!("{ENV_API_URL} is not set")));
        }
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            GatewayError::Config(format!("{ENV_API_URL} is not a valid URL: {e}"))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(GatewayError::Config(format!(
                "{ENV_API_URL} must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.api.username.is_empty() {
            return Err(GatewayError::Config(format!("{ENV_API_USERNAME} is not set")));
        }
        if self.api.password.is_empty() {
            return Err(GatewayError::Config(format!("{ENV_API_PASSWORD} is not set")));
        }
        Ok(())
    }

    /// Copy safe to print or log
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.api.password.is_empty() {
            copy.api.password = "<redacted>".to_string();
        }
        copy
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
