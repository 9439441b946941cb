//! Daemon entry point for the Zurich open data MCP server.
//!
//! Loads configuration from CLI arguments and the environment, builds the
//! control plane, and serves the MCP protocol over stdio or streamable HTTP.

mod config;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use zurich_core::OpenDataControlPlane;
use zurich_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};

use crate::config::{Transport, ZurichConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ZurichConfig::from_args()?;
    info!(
        transport = ?config.transport,
        catalog = %config.endpoints.catalog,
        "starting zurich-mcpd"
    );
    let control = Arc::new(OpenDataControlPlane::new(config.endpoints));

    match config.transport {
        Transport::Stdio => serve_stdio(control).await,
        Transport::Http => {
            serve_streamable_http(control, McpHttpServerConfig::new(config.http_addr)).await
        }
    }
}
