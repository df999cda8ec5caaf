//! Shared types and configuration for the backup portal MCP gateway

pub mod config;
pub mod error;
pub mod types;

pub use config::{ApiConfig, GatewayConfig, LogFormat, LoggingConfig, TransportConfig, TransportKind};
pub use error::{GatewayError, Result};
pub use types::*;
