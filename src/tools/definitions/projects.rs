//! GitHub Projects tools

use super::clamp_per_page;
use crate::error::ToolError;
use crate::github::GitHubClient;
use crate::tools::{ToolContext, ToolExecutor, ToolOutput, github_tool};
use crate::util::QueryBuilder;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

/// Kind of account that owns a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    #[default]
    Org,
    User,
}

impl OwnerType {
    fn base_path(self, owner: &str) -> String {
        let owner = GitHubClient::encode_segment(owner);
        match self {
            OwnerType::Org => format!("/orgs/{}/projectsV2", owner),
            OwnerType::User => format!("/users/{}/projectsV2", owner),
        }
    }
}

fn default_project_page_size() -> u32 {
    20
}

/// List projects
#[github_tool(
    name = "list_projects",
    description = "List GitHub Projects owned by an organization or user",
    toolset = "projects",
    operation = "read"
)]
pub struct ListProjects {
    /// Organization or user login
    pub owner: String,
    /// Owner kind: org or user (default: org)
    #[serde(default)]
    pub owner_type: OwnerType,
    /// Filter projects by this query
    #[serde(default)]
    pub query: Option<String>,
    /// Results per page (default: 20, max: 100)
    #[serde(default = "default_project_page_size")]
    pub per_page: u32,
    /// Cursor for the next page
    #[serde(default)]
    pub after: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListProjects {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = QueryBuilder::new()
            .optional("q", self.query.as_ref())
            .param("per_page", clamp_per_page(self.per_page))
            .optional("after", self.after.as_ref())
            .build();

        let endpoint = format!("{}{}", self.owner_type.base_path(&self.owner), query);
        let projects: Value = ctx.github.get(&endpoint).await?;
        ToolOutput::json_value(projects)
    }
}

/// Get a project
#[github_tool(
    name = "get_project",
    description = "Get details of a GitHub Project by number",
    toolset = "projects",
    operation = "read"
)]
pub struct GetProject {
    /// Organization or user login
    pub owner: String,
    /// Owner kind: org or user (default: org)
    #[serde(default)]
    pub owner_type: OwnerType,
    /// Project number
    pub project_number: u64,
}

#[async_trait]
impl ToolExecutor for GetProject {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let endpoint = format!(
            "{}/{}",
            self.owner_type.base_path(&self.owner),
            self.project_number
        );
        let project: Value = ctx.github.get(&endpoint).await?;
        ToolOutput::json_value(project)
    }
}

/// List project items
#[github_tool(
    name = "list_project_items",
    description = "List the items (issues, pull requests, drafts) of a GitHub Project",
    toolset = "projects",
    operation = "read"
)]
pub struct ListProjectItems {
    /// Organization or user login
    pub owner: String,
    /// Owner kind: org or user (default: org)
    #[serde(default)]
    pub owner_type: OwnerType,
    /// Project number
    pub project_number: u64,
    /// Filter items by this query
    #[serde(default)]
    pub query: Option<String>,
    /// Results per page (default: 20, max: 100)
    #[serde(default = "default_project_page_size")]
    pub per_page: u32,
    /// Cursor for the next page
    #[serde(default)]
    pub after: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListProjectItems {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = QueryBuilder::new()
            .optional("q", self.query.as_ref())
            .param("per_page", clamp_per_page(self.per_page))
            .optional("after", self.after.as_ref())
            .build();

        let endpoint = format!(
            "{}/{}/items{}",
            self.owner_type.base_path(&self.owner),
            self.project_number,
            query
        );
        let items: Value = ctx.github.get(&endpoint).await?;
        ToolOutput::json_value(items)
    }
}
