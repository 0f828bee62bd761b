//! Configuration types for octo-mcp
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::util::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Public GitHub REST endpoint
pub const GITHUB_COM_API_URL: &str = "https://api.github.com";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// GitHub connection settings
    pub github: GitHubConfig,

    /// Server/transport settings
    pub server: ServerConfig,

    /// Lockdown (content trust) settings
    pub lockdown: LockdownConfig,

    /// Which tools are exposed
    pub toolsets: ToolsetsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// GitHub connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub host. `https://github.com` (the default) talks to api.github.com;
    /// anything else is treated as a GitHub Enterprise Server instance.
    pub host: String,

    /// Personal access token (prefer env var GITHUB_PERSONAL_ACCESS_TOKEN)
    pub token: Option<SecretString>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries for failed requests
    pub max_retries: u32,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            host: "https://github.com".to_string(),
            token: None,
            timeout_secs: 30,
            max_retries: 3,
            verify_ssl: true,
        }
    }
}

impl GitHubConfig {
    fn is_dotcom(&self) -> bool {
        let host = self.host.trim_end_matches('/');
        host == "https://github.com" || host == "https://api.github.com"
    }

    /// Base URL for REST calls
    pub fn rest_url(&self) -> String {
        if self.is_dotcom() {
            GITHUB_COM_API_URL.to_string()
        } else {
            format!("{}/api/v3", self.host.trim_end_matches('/'))
        }
    }

    /// Endpoint for GraphQL queries
    pub fn graphql_url(&self) -> String {
        if self.is_dotcom() {
            format!("{}/graphql", GITHUB_COM_API_URL)
        } else {
            format!("{}/api/graphql", self.host.trim_end_matches('/'))
        }
    }
}

/// Server/transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Transport mode
    pub transport: TransportMode,

    /// HTTP host (for http transport)
    pub host: String,

    /// HTTP port (for http transport)
    pub port: u16,

    /// Server name for MCP
    pub name: String,

    /// Server version for MCP
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportMode::Stdio,
            host: "127.0.0.1".to_string(),
            port: 8082,
            name: "octo-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Transport mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Standard input/output (default)
    #[default]
    Stdio,
    /// Streamable HTTP
    Http,
}

/// Lockdown mode configuration
///
/// When enabled, content authored by users without push access to a public
/// repository is withheld from tool results.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LockdownConfig {
    /// Filter content by author trust
    pub enabled: bool,

    /// How long a permission verdict stays valid
    pub cache_ttl_secs: u64,

    /// Upper bound on cached verdicts
    pub max_entries: usize,
}

impl Default for LockdownConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cache_ttl_secs: 300,
            max_entries: 10_000,
        }
    }
}

impl LockdownConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Toolset selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsetsConfig {
    /// Enabled toolset names; `all` enables every toolset
    pub enabled: Vec<String>,

    /// Hide and refuse every tool that modifies GitHub state
    pub read_only: bool,
}

impl Default for ToolsetsConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["all".to_string()],
            read_only: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
