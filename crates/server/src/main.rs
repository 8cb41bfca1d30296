//! wikicard-mcp server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use wikicard_core::{AppConfig, SiteRegistry};

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    let sites = match &config.sites_file {
        Some(path) => SiteRegistry::load_json(path).await?,
        None => SiteRegistry::default(),
    };
    tracing::info!(sites = sites.snapshot().await.len(), "Starting wikicard-mcp server on stdio transport");

    let handler = handler::WikiCardServer::new(&config, sites)?;
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
