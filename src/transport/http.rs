//! Streamable HTTP transport
//!
//! Serves MCP over HTTP on a single endpoint (`/mcp` by default). Each client
//! session gets its own handler from the factory.

use crate::server::OctoMcpHandler;
use crate::util::find_available_port;
use axum::Router;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub const DEFAULT_HTTP_PATH: &str = "/mcp";

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Address to bind to. The port is a preference; the next free one is used
    /// when it is taken.
    pub bind: SocketAddr,
    /// Endpoint path
    pub path: String,
}

impl HttpConfig {
    pub fn new(bind: SocketAddr) -> Self {
        Self {
            bind,
            path: DEFAULT_HTTP_PATH.to_string(),
        }
    }

    pub fn from_host_port(host: &str, port: u16) -> Result<Self, std::net::AddrParseError> {
        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        Ok(Self::new(addr))
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }
}

/// Handle to a server started by [`run_http`]
#[derive(Debug, Clone)]
pub struct RunningHttpServer {
    pub local_addr: SocketAddr,
    /// Cancel to shut the server down gracefully
    pub ct: CancellationToken,
}

impl RunningHttpServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.local_addr, path)
    }
}

/// Start the HTTP server in the background
pub async fn run_http<F>(handler_factory: F, config: HttpConfig) -> anyhow::Result<RunningHttpServer>
where
    F: Fn() -> OctoMcpHandler + Send + Sync + 'static,
{
    let host = config.bind.ip().to_string();
    let port = find_available_port(&host, config.bind.port()).await?;
    let bind_addr = SocketAddr::new(config.bind.ip(), port);

    let service = StreamableHttpService::new(
        move || Ok(handler_factory()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    let app = Router::new()
        .nest_service(&config.path, service)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(
        "Starting octo-mcp with streamable HTTP transport on http://{}{}",
        local_addr, config.path
    );

    let ct = CancellationToken::new();
    let shutdown = ct.clone();
    tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled_owned().await })
            .await;
        if let Err(e) = result {
            error!(error = %e, "HTTP server failed");
        }
    });

    Ok(RunningHttpServer { local_addr, ct })
}

/// Run the HTTP server until Ctrl+C
pub async fn run_http_blocking<F>(handler_factory: F, config: HttpConfig) -> anyhow::Result<()>
where
    F: Fn() -> OctoMcpHandler + Send + Sync + 'static,
{
    let server = run_http(handler_factory, config).await?;

    info!("Press Ctrl+C to stop the server");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received shutdown signal"),
        _ = server.ct.cancelled() => info!("Server cancelled"),
    }
    server.ct.cancel();

    info!("HTTP server stopped");
    Ok(())
}
