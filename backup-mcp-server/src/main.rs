//! Backup portal MCP gateway
//!
//! Exposes read-only backup portal REST endpoints as Model Context Protocol
//! tools, over stdio or HTTP.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use backup_mcp_server::{transport, BackupMcpServer};
use backup_mcp_shared::{GatewayConfig, LogFormat, LoggingConfig, TransportKind};

#[derive(Debug, Parser)]
#[command(name = "backup-mcp-server", version, about)]
struct Cli {
    /// Inbound transport (stdio or http)
    #[arg(long)]
    transport: Option<TransportKind>,

    /// Listen address for the http transport
    #[arg(long)]
    host: Option<String>,

    /// Listen port for the http transport
    #[arg(long)]
    port: Option<u16>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (pretty or json)
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Print the effective configuration with secrets redacted, then exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn apply(&self, config: &mut GatewayConfig) {
        if let Some(kind) = self.transport {
            config.transport.kind = kind;
        }
        if let Some(host) = &self.host {
            config.transport.host = host.clone();
        }
        if let Some(port) = self.port {
            config.transport.port = port;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = GatewayConfig::from_env()?;
    cli.apply(&mut config);

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    init_logging(&config.logging)?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        eprintln!("Error: {e}");
        eprintln!("Set BACKUP_API_URL, BACKUP_API_USERNAME and BACKUP_API_PASSWORD.");
        std::process::exit(1);
    }

    info!("Starting backup portal MCP gateway");
    let server = BackupMcpServer::new(config.clone())?;

    let result = match config.transport.kind {
        TransportKind::Stdio => transport::stdio::run(server).await,
        TransportKind::Http => {
            transport::http::run(server, &config.transport.host, config.transport.port).await
        }
    };

    match result {
        Ok(()) => {
            info!("Backup portal MCP gateway shut down gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Backup portal MCP gateway error: {}", e);
            Err(e.into())
        }
    }
}

/// Logs go to stderr; stdout carries the stdio transport
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    match logging.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.finish())?,
    }
    Ok(())
}
