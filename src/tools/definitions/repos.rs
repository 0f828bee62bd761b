//! Repository tools

use super::{clamp_per_page, default_page, default_per_page, repo_path};
use crate::error::ToolError;
use crate::github::GitHubClient;
use crate::tools::{ToolContext, ToolExecutor, ToolOutput, github_tool};
use crate::util::QueryBuilder;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

/// Get file or directory contents
#[github_tool(
    name = "get_file_contents",
    description = "Get the contents of a file or directory from a GitHub repository",
    toolset = "repos",
    operation = "read"
)]
pub struct GetFileContents {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Path to the file or directory
    #[serde(default)]
    pub path: String,
    /// Branch, tag or commit SHA (default: the repository's default branch)
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetFileContents {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let path = self
            .path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(GitHubClient::encode_segment)
            .collect::<Vec<_>>()
            .join("/");
        let query = QueryBuilder::new()
            .optional("ref", self.git_ref.as_ref())
            .build();

        let endpoint = format!(
            "{}/contents/{}{}",
            repo_path(&self.owner, &self.repo),
            path,
            query
        );
        let contents: Value = ctx.github.get(&endpoint).await?;

        // Directories come back as arrays
        if contents.is_array() {
            return ToolOutput::json_value(contents);
        }

        match decode_file_content(&contents) {
            Some(text) => ToolOutput::json_value(json!({
                "path": contents.get("path"),
                "sha": contents.get("sha"),
                "size": contents.get("size"),
                "html_url": contents.get("html_url"),
                "content": text,
            })),
            None => ToolOutput::json_value(contents),
        }
    }
}

/// Decode a base64 file body to UTF-8. Binary files yield `None`.
fn decode_file_content(file: &Value) -> Option<String> {
    if file.get("encoding").and_then(Value::as_str) != Some("base64") {
        return None;
    }
    let encoded: String = file
        .get("content")?
        .as_str()?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

/// List branches
#[github_tool(
    name = "list_branches",
    description = "List branches in a GitHub repository",
    toolset = "repos",
    operation = "read"
)]
pub struct ListBranches {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Only protected branches
    #[serde(default)]
    pub protected: Option<bool>,
    /// Page number (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page (default: 30, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[async_trait]
impl ToolExecutor for ListBranches {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = QueryBuilder::new()
            .optional("protected", self.protected)
            .param("page", self.page)
            .param("per_page", clamp_per_page(self.per_page))
            .build();

        let endpoint = format!("{}/branches{}", repo_path(&self.owner, &self.repo), query);
        let branches: Value = ctx.github.get(&endpoint).await?;
        ToolOutput::json_value(branches)
    }
}

/// Search repositories
#[github_tool(
    name = "search_repositories",
    description = "Search GitHub repositories using GitHub search syntax",
    toolset = "repos",
    operation = "read"
)]
pub struct SearchRepositories {
    /// Search query, e.g. "language:rust topic:mcp"
    pub query: String,
    /// Sort by: stars, forks, help-wanted-issues, or updated
    #[serde(default)]
    pub sort: Option<String>,
    /// Sort order: asc or desc
    #[serde(default)]
    pub order: Option<String>,
    /// Page number (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page (default: 30, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[async_trait]
impl ToolExecutor for SearchRepositories {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        if self.query.trim().is_empty() {
            return Err(ToolError::InvalidArguments("query must not be empty".into()));
        }

        let query = QueryBuilder::new()
            .param("q", &self.query)
            .optional("sort", self.sort.as_ref())
            .optional("order", self.order.as_ref())
            .param("page", self.page)
            .param("per_page", clamp_per_page(self.per_page))
            .build();

        let results: Value = ctx
            .github
            .get(&format!("/search/repositories{}", query))
            .await?;
        ToolOutput::json_value(results)
    }
}
