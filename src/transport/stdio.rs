//! Stdio transport

use crate::server::OctoMcpHandler;
use rmcp::ServiceExt;
use rmcp::transport::io::stdio;
use tracing::info;

/// Serve a single client over stdin/stdout until it disconnects
pub async fn run_stdio(handler: OctoMcpHandler) -> anyhow::Result<()> {
    info!("Starting octo-mcp with stdio transport");

    let server = handler.serve(stdio()).await?;
    let reason = server.waiting().await?;

    info!(?reason, "octo-mcp stopped");
    Ok(())
}
