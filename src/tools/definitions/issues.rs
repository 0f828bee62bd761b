//! Issue tools

use super::{clamp_per_page, default_page, default_per_page, repo_path};
use crate::error::ToolError;
use crate::github::rest_author_login;
use crate::tools::{ToolContext, ToolExecutor, ToolOutput, github_tool};
use crate::util::QueryBuilder;
use async_trait::async_trait;
use serde_json::{Map, Value, json};

/// Get a single issue
#[github_tool(
    name = "get_issue",
    description = "Get details of a specific issue in a GitHub repository",
    toolset = "issues",
    operation = "read"
)]
pub struct GetIssue {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Issue number
    pub issue_number: u64,
}

#[async_trait]
impl ToolExecutor for GetIssue {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let endpoint = format!(
            "{}/issues/{}",
            repo_path(&self.owner, &self.repo),
            self.issue_number
        );
        let issue: Value = ctx.github.get(&endpoint).await?;

        let resource = format!("issue {}/{}#{}", self.owner, self.repo, self.issue_number);
        ctx.content
            .ensure_author_allowed(rest_author_login(&issue), &self.owner, &self.repo, &resource)
            .await?;

        ToolOutput::json_value(issue)
    }
}

/// List issues in a repository
#[github_tool(
    name = "list_issues",
    description = "List issues in a GitHub repository with optional filtering by state, labels and sort order",
    toolset = "issues",
    operation = "read"
)]
pub struct ListIssues {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Filter by state: open, closed, or all
    #[serde(default)]
    pub state: Option<String>,
    /// Comma-separated label names
    #[serde(default)]
    pub labels: Option<String>,
    /// Sort by: created, updated, or comments
    #[serde(default)]
    pub sort: Option<String>,
    /// Sort direction: asc or desc
    #[serde(default)]
    pub direction: Option<String>,
    /// Only issues updated at or after this ISO 8601 timestamp
    #[serde(default)]
    pub since: Option<String>,
    /// Page number (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page (default: 30, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[async_trait]
impl ToolExecutor for ListIssues {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = QueryBuilder::new()
            .optional("state", self.state.as_ref())
            .optional("labels", self.labels.as_ref())
            .optional("sort", self.sort.as_ref())
            .optional("direction", self.direction.as_ref())
            .optional("since", self.since.as_ref())
            .param("page", self.page)
            .param("per_page", clamp_per_page(self.per_page))
            .build();

        let endpoint = format!("{}/issues{}", repo_path(&self.owner, &self.repo), query);
        let mut issues: Vec<Value> = ctx.github.get(&endpoint).await?;
        ctx.content
            .retain_safe(&mut issues, &self.owner, &self.repo, rest_author_login)
            .await?;

        ToolOutput::json(&issues)
    }
}

/// List comments on an issue
#[github_tool(
    name = "list_issue_comments",
    description = "List comments on a GitHub issue",
    toolset = "issues",
    operation = "read"
)]
pub struct ListIssueComments {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Issue number
    pub issue_number: u64,
    /// Page number (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page (default: 30, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[async_trait]
impl ToolExecutor for ListIssueComments {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = QueryBuilder::new()
            .param("page", self.page)
            .param("per_page", clamp_per_page(self.per_page))
            .build();
        let endpoint = format!(
            "{}/issues/{}/comments{}",
            repo_path(&self.owner, &self.repo),
            self.issue_number,
            query
        );

        let mut comments: Vec<Value> = ctx.github.get(&endpoint).await?;
        ctx.content
            .retain_safe(&mut comments, &self.owner, &self.repo, rest_author_login)
            .await?;

        ToolOutput::json(&comments)
    }
}

/// Create an issue
#[github_tool(
    name = "create_issue",
    description = "Create a new issue in a GitHub repository",
    toolset = "issues",
    operation = "write"
)]
pub struct CreateIssue {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Issue title
    pub title: String,
    /// Issue body (Markdown)
    #[serde(default)]
    pub body: Option<String>,
    /// Labels to apply
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    /// Logins to assign
    #[serde(default)]
    pub assignees: Option<Vec<String>>,
}

#[async_trait]
impl ToolExecutor for CreateIssue {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let mut body = json!({ "title": self.title });
        if let Some(text) = &self.body {
            body["body"] = json!(text);
        }
        if let Some(labels) = &self.labels {
            body["labels"] = json!(labels);
        }
        if let Some(assignees) = &self.assignees {
            body["assignees"] = json!(assignees);
        }

        let endpoint = format!("{}/issues", repo_path(&self.owner, &self.repo));
        let issue: Value = ctx.github.post(&endpoint, &body).await?;
        ToolOutput::json_value(issue)
    }
}

/// Update an issue
#[github_tool(
    name = "update_issue",
    description = "Update the title, body, state, labels or assignees of an existing issue",
    toolset = "issues",
    operation = "write"
)]
pub struct UpdateIssue {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Issue number
    pub issue_number: u64,
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New body
    #[serde(default)]
    pub body: Option<String>,
    /// New state: open or closed
    #[serde(default)]
    pub state: Option<String>,
    /// Replacement label set
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    /// Replacement assignee set
    #[serde(default)]
    pub assignees: Option<Vec<String>>,
}

#[async_trait]
impl ToolExecutor for UpdateIssue {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let mut body = Map::new();
        if let Some(title) = &self.title {
            body.insert("title".into(), json!(title));
        }
        if let Some(text) = &self.body {
            body.insert("body".into(), json!(text));
        }
        if let Some(state) = &self.state {
            if state != "open" && state != "closed" {
                return Err(ToolError::InvalidArguments(format!(
                    "state must be 'open' or 'closed', got '{}'",
                    state
                )));
            }
            body.insert("state".into(), json!(state));
        }
        if let Some(labels) = &self.labels {
            body.insert("labels".into(), json!(labels));
        }
        if let Some(assignees) = &self.assignees {
            body.insert("assignees".into(), json!(assignees));
        }
        if body.is_empty() {
            return Err(ToolError::InvalidArguments(
                "at least one field to update is required".into(),
            ));
        }

        let endpoint = format!(
            "{}/issues/{}",
            repo_path(&self.owner, &self.repo),
            self.issue_number
        );
        let issue: Value = ctx.github.patch(&endpoint, &Value::Object(body)).await?;
        ToolOutput::json_value(issue)
    }
}

/// Comment on an issue
#[github_tool(
    name = "add_issue_comment",
    description = "Add a comment to an issue or pull request",
    toolset = "issues",
    operation = "write"
)]
pub struct AddIssueComment {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Issue or pull request number
    pub issue_number: u64,
    /// Comment body (Markdown)
    pub body: String,
}

#[async_trait]
impl ToolExecutor for AddIssueComment {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        if self.body.trim().is_empty() {
            return Err(ToolError::InvalidArguments("comment body must not be empty".into()));
        }

        let endpoint = format!(
            "{}/issues/{}/comments",
            repo_path(&self.owner, &self.repo),
            self.issue_number
        );
        let comment: Value = ctx
            .github
            .post(&endpoint, &json!({ "body": self.body }))
            .await?;
        ToolOutput::json_value(comment)
    }
}
