//! Shared helpers for integration tests
#![allow(dead_code)]

use octo_mcp::auth::PatProvider;
use octo_mcp::config::{AppConfig, GitHubConfig};
use octo_mcp::github::GitHubClient;
use octo_mcp::lockdown::{ContentFilter, PermissionLookup, RepoAccessCache};
use octo_mcp::tools::{ContentBlock, ToolContext, ToolOutput, ToolRegistry, definitions};
use octo_mcp::toolsets::ToolFilter;
use octo_mcp::util::SecretString;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GRAPHQL_PATH: &str = "/api/graphql";

/// GitHub config pointing at the mock server (treated as Enterprise Server)
pub fn github_config(mock_server: &MockServer) -> GitHubConfig {
    GitHubConfig {
        host: mock_server.uri(),
        token: Some(SecretString::new("test-token")),
        timeout_secs: 5,
        max_retries: 0,
        verify_ssl: true,
    }
}

pub fn create_test_github(mock_server: &MockServer) -> Arc<GitHubClient> {
    let auth = PatProvider::new("test-token").unwrap();
    Arc::new(GitHubClient::new(&github_config(mock_server), Box::new(auth)).unwrap())
}

pub fn app_config(mock_server: &MockServer) -> AppConfig {
    AppConfig {
        github: github_config(mock_server),
        ..Default::default()
    }
}

pub fn create_cache(github: &Arc<GitHubClient>) -> Arc<RepoAccessCache> {
    let lookup: Arc<dyn PermissionLookup> = github.clone();
    Arc::new(RepoAccessCache::new(lookup, Duration::from_secs(300)))
}

pub fn create_context(github: Arc<GitHubClient>, content: ContentFilter) -> ToolContext {
    ToolContext::new(github, Arc::new(ToolFilter::allow_all()), content, "test-request-123")
}

/// Context with lockdown mode on, backed by a fresh cache
pub fn lockdown_context(github: Arc<GitHubClient>) -> ToolContext {
    let cache = create_cache(&github);
    create_context(
        github,
        ContentFilter::new(true, Some(cache), CancellationToken::new()),
    )
}

pub fn create_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    definitions::register_all_tools(&mut registry);
    registry
}

pub fn output_text(output: &ToolOutput) -> &str {
    match &output.content[0] {
        ContentBlock::Text { text } => text,
    }
}

pub fn output_json(output: &ToolOutput) -> Value {
    serde_json::from_str(output_text(output)).unwrap()
}

/// Answer for the repository access query of one user
pub fn permission_response(is_private: bool, login: &str, permission: Option<&str>) -> Value {
    let edges = match permission {
        Some(permission) => json!([{"permission": permission, "node": {"login": login}}]),
        None => json!([]),
    };
    json!({
        "data": {
            "repository": {
                "isPrivate": is_private,
                "collaborators": {"edges": edges}
            }
        }
    })
}

/// Mount the repository access query answer for `owner/repo` and `login`
pub async fn mount_permission(
    mock_server: &MockServer,
    owner: &str,
    repo: &str,
    login: &str,
    is_private: bool,
    permission: Option<&str>,
) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({
            "variables": {"owner": owner, "name": repo, "username": login}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(permission_response(is_private, login, permission)),
        )
        .mount(mock_server)
        .await;
}
