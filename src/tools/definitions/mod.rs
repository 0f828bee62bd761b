//! Tool definitions
//!
//! Every tool is declared with `#[github_tool]` and registers itself at
//! startup. Tools returning user-authored content pass it through the
//! request's [`ContentFilter`](crate::lockdown::ContentFilter) first.

pub mod context;
pub mod issues;
pub mod projects;
pub mod pull_requests;
pub mod repos;
pub mod security;

use crate::github::GitHubClient;
use crate::tools::ToolRegistry;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut ToolRegistry) {
    registry.register_all_auto();
}

pub(crate) fn default_page() -> u32 {
    1
}

pub(crate) fn default_per_page() -> u32 {
    30
}

/// GitHub caps page sizes at 100
pub(crate) fn clamp_per_page(per_page: u32) -> u32 {
    per_page.clamp(1, 100)
}

/// `/repos/{owner}/{repo}` with both segments encoded
pub(crate) fn repo_path(owner: &str, repo: &str) -> String {
    format!(
        "/repos/{}/{}",
        GitHubClient::encode_segment(owner),
        GitHubClient::encode_segment(repo)
    )
}
