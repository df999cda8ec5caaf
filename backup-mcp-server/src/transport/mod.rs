//! Inbound MCP transports

pub mod http;
pub mod stdio;
