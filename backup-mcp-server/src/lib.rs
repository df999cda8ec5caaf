//! Model Context Protocol gateway for the backup portal REST API
//!
//! Tools map onto read-only portal endpoints. The server is reachable over
//! stdio or streamable HTTP.

pub mod server;
pub mod tools;
pub mod transport;

pub use server::BackupMcpServer;
