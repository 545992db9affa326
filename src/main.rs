//! PDF Tools MCP Server entry point.
//!
//! This binary starts the MCP server using STDIO transport.

use pdf_tools_mcp_server::PdfToolsServer;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to stderr (important for STDIO transport)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_tools_mcp_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting PDF Tools MCP Server v{}", env!("CARGO_PKG_VERSION"));
    // stdout carries the protocol, so the tool banner goes to the log.
    tracing::info!("Available tools:");
    for (name, summary) in PdfToolsServer::banner() {
        tracing::info!("  - {}: {}", name, summary);
    }

    let server = PdfToolsServer::new();

    // Serve over STDIO
    let service = server.serve(rmcp::transport::stdio()).await?;

    // Wait for the service to complete
    service.waiting().await?;

    tracing::info!("PDF Tools MCP Server stopped");
    Ok(())
}
