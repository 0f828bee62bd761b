//! octo-mcp
//!
//! GitHub MCP server with lockdown mode for untrusted content.

use clap::Parser;
use octo_mcp::{
    auth::create_auth_provider,
    config::{AppConfig, LogFormat, TransportMode, load_config, validate_config},
    github::GitHubClient,
    lockdown::{PermissionLookup, RepoAccessCache},
    server::OctoMcpHandler,
    transport::{HttpConfig, run_http_blocking, run_stdio},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// GitHub MCP server
#[derive(Parser, Debug)]
#[command(name = "octo-mcp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "OCTO_MCP_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "OCTO_MCP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Transport mode (stdio, http)
    #[arg(long, env = "OCTO_MCP_TRANSPORT", value_parser = ["stdio", "http"])]
    transport: Option<String>,

    /// HTTP server host (for http transport)
    #[arg(long, env = "OCTO_MCP_HTTP_HOST")]
    http_host: Option<String>,

    /// HTTP server port (for http transport)
    #[arg(long, env = "OCTO_MCP_HTTP_PORT")]
    http_port: Option<u16>,

    /// Withhold content from authors without push access to public repositories
    #[arg(long, env = "GITHUB_LOCKDOWN_MODE")]
    lockdown_mode: bool,

    /// Only expose read tools
    #[arg(long, env = "GITHUB_READ_ONLY")]
    read_only: bool,

    /// Comma-separated toolsets to enable (default: all)
    #[arg(long, env = "GITHUB_TOOLSETS", value_delimiter = ',')]
    toolsets: Option<Vec<String>>,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(transport) = self.transport.as_deref() {
            config.server.transport = match transport {
                "http" => TransportMode::Http,
                _ => TransportMode::Stdio,
            };
        }
        if let Some(host) = &self.http_host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.http_port {
            config.server.port = port;
        }
        if self.lockdown_mode {
            config.lockdown.enabled = true;
        }
        if self.read_only {
            config.toolsets.read_only = true;
        }
        if let Some(toolsets) = &self.toolsets {
            config.toolsets.enabled = toolsets.iter().map(|t| t.trim().to_string()).collect();
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // stdout belongs to the stdio transport
    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);
    validate_config(&config, true)?;

    init_logging(&config);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting octo-mcp");

    let auth = create_auth_provider(&config.github)
        .inspect_err(|e| error!(error = %e, "Failed to create auth provider"))?;

    let github = Arc::new(
        GitHubClient::new(&config.github, auth)
            .inspect_err(|e| error!(error = %e, "Failed to create GitHub client"))?,
    );

    let repo_access = if config.lockdown.enabled {
        let lookup: Arc<dyn PermissionLookup> = github.clone();
        info!(
            ttl_secs = config.lockdown.cache_ttl_secs,
            max_entries = config.lockdown.max_entries,
            "Lockdown mode enabled"
        );
        Some(Arc::new(RepoAccessCache::with_max_entries(
            lookup,
            config.lockdown.cache_ttl(),
            config.lockdown.max_entries,
        )))
    } else {
        None
    };

    let handler = OctoMcpHandler::new(&config, github, repo_access);

    match config.server.transport {
        TransportMode::Stdio => run_stdio(handler).await?,
        TransportMode::Http => {
            let http_config = HttpConfig::from_host_port(&config.server.host, config.server.port)?;
            run_http_blocking(move || handler.clone(), http_config).await?;
        }
    }

    Ok(())
}
