//! ChainGate MCP Server - Entry point

use anyhow::Result;
use clap::Parser;
use rmcp::service::ServiceExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chaingate_mcp::{
    catalog::GatewayCatalog, config::GatewayConfig, gateway::GatewayFacade, ChainGateHandler,
};

/// ChainGate MCP Server - Model Context Protocol server routing blockchain calls to per-chain gateways
#[derive(Parser, Debug)]
#[command(name = "chaingate-mcp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the MCP protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration from CLI flag or environment
    let config = match cli.config {
        Some(ref config_path) => GatewayConfig::from_file(config_path)?,
        None => GatewayConfig::from_env(),
    };
    log_config_status(&config);

    // Load the vendor gateway catalog embedded at compile time
    let catalog = GatewayCatalog::embedded()?;
    info!(
        gateways = catalog.entries().len(),
        "loaded vendor gateway catalog"
    );

    let facade = GatewayFacade::new(config, catalog)?;
    let handler = ChainGateHandler::new(facade);

    // Serve using stdio transport
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let service = handler.serve((stdin, stdout)).await?;
    service.waiting().await?;

    Ok(())
}

/// Log the active configuration to stderr for visibility.
fn log_config_status(config: &GatewayConfig) {
    if config.api_key.is_none() {
        info!("no vendor API key configured; gateway requests go out unauthenticated");
    }
    if !config.custom_rpc.is_empty() {
        info!(
            overrides = config.custom_rpc.len(),
            "custom RPC overrides active; vendor credentials are withheld on those chains"
        );
    }
    // retry_attempts is declared for callers; the transport never retries
    info!(
        timeout_ms = config.timeout_ms,
        retry_attempts = config.retry_attempts,
        "transport configuration"
    );
}
