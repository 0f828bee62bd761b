//! GitHub MCP server with lockdown mode
//!
//! Exposes GitHub issues, pull requests, repositories, projects and security
//! alerts to MCP clients.
//!
//! ## Lockdown mode
//!
//! Public repositories accept issues and comments from anyone, and that text
//! ends up in the agent's context. With lockdown mode on, content is only
//! returned when its author has push access to the repository (or the
//! repository is private). Verdicts come from one GraphQL query per
//! `(owner, repo, author)` and are cached with a TTL.
//!
//! ## Example Configuration
//!
//! ```toml
//! [github]
//! host = "https://github.com"
//! # token from GITHUB_PERSONAL_ACCESS_TOKEN
//!
//! [lockdown]
//! enabled = true
//! cache_ttl_secs = 300
//!
//! [toolsets]
//! enabled = ["issues", "pull_requests"]
//! read_only = true
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod github;
pub mod lockdown;
pub mod server;
pub mod tools;
pub mod toolsets;
pub mod transport;
pub mod util;

pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
pub use lockdown::{ContentFilter, RepoAccessCache};
pub use server::OctoMcpHandler;
