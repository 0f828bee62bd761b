//! Pull request tools

use super::{clamp_per_page, default_page, default_per_page, repo_path};
use crate::error::{GitHubError, ToolError, ToolResult};
use crate::github::{graphql_author_login, rest_author_login};
use crate::lockdown::ContentFilter;
use crate::tools::{ToolContext, ToolExecutor, ToolOutput, github_tool};
use crate::util::QueryBuilder;
use async_trait::async_trait;
use serde_json::{Value, json};

const REVIEW_THREADS_QUERY: &str = r#"
query($owner: String!, $repo: String!, $number: Int!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $number) {
      reviewThreads(first: $first, after: $after) {
        totalCount
        pageInfo {
          hasNextPage
          endCursor
        }
        nodes {
          id
          isResolved
          isOutdated
          isCollapsed
          path
          line
          comments(first: 100) {
            totalCount
            nodes {
              id
              body
              createdAt
              url
              author {
                login
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// Get a single pull request
#[github_tool(
    name = "get_pull_request",
    description = "Get details of a specific pull request in a GitHub repository",
    toolset = "pull_requests",
    operation = "read"
)]
pub struct GetPullRequest {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub pull_number: u64,
}

#[async_trait]
impl ToolExecutor for GetPullRequest {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let endpoint = format!(
            "{}/pulls/{}",
            repo_path(&self.owner, &self.repo),
            self.pull_number
        );
        let pull: Value = ctx.github.get(&endpoint).await?;

        let resource = format!(
            "pull request {}/{}#{}",
            self.owner, self.repo, self.pull_number
        );
        ctx.content
            .ensure_author_allowed(rest_author_login(&pull), &self.owner, &self.repo, &resource)
            .await?;

        ToolOutput::json_value(pull)
    }
}

/// List pull requests
#[github_tool(
    name = "list_pull_requests",
    description = "List pull requests in a GitHub repository with optional filtering by state and branches",
    toolset = "pull_requests",
    operation = "read"
)]
pub struct ListPullRequests {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Filter by state: open, closed, or all
    #[serde(default)]
    pub state: Option<String>,
    /// Filter by head branch as `user:ref-name`
    #[serde(default)]
    pub head: Option<String>,
    /// Filter by base branch
    #[serde(default)]
    pub base: Option<String>,
    /// Sort by: created, updated, popularity, or long-running
    #[serde(default)]
    pub sort: Option<String>,
    /// Sort direction: asc or desc
    #[serde(default)]
    pub direction: Option<String>,
    /// Page number (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page (default: 30, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[async_trait]
impl ToolExecutor for ListPullRequests {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = QueryBuilder::new()
            .optional("state", self.state.as_ref())
            .optional("head", self.head.as_ref())
            .optional("base", self.base.as_ref())
            .optional("sort", self.sort.as_ref())
            .optional("direction", self.direction.as_ref())
            .param("page", self.page)
            .param("per_page", clamp_per_page(self.per_page))
            .build();

        let endpoint = format!("{}/pulls{}", repo_path(&self.owner, &self.repo), query);
        let mut pulls: Vec<Value> = ctx.github.get(&endpoint).await?;
        ctx.content
            .retain_safe(&mut pulls, &self.owner, &self.repo, rest_author_login)
            .await?;

        ToolOutput::json(&pulls)
    }
}

/// List review comments on a pull request
#[github_tool(
    name = "list_pull_request_comments",
    description = "List review comments on the diff of a pull request",
    toolset = "pull_requests",
    operation = "read"
)]
pub struct ListPullRequestComments {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub pull_number: u64,
    /// Page number (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page (default: 30, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[async_trait]
impl ToolExecutor for ListPullRequestComments {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = QueryBuilder::new()
            .param("page", self.page)
            .param("per_page", clamp_per_page(self.per_page))
            .build();
        let endpoint = format!(
            "{}/pulls/{}/comments{}",
            repo_path(&self.owner, &self.repo),
            self.pull_number,
            query
        );

        let mut comments: Vec<Value> = ctx.github.get(&endpoint).await?;
        ctx.content
            .retain_safe(&mut comments, &self.owner, &self.repo, rest_author_login)
            .await?;

        ToolOutput::json(&comments)
    }
}

/// List reviews on a pull request
#[github_tool(
    name = "list_pull_request_reviews",
    description = "List reviews submitted on a pull request",
    toolset = "pull_requests",
    operation = "read"
)]
pub struct ListPullRequestReviews {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub pull_number: u64,
    /// Page number (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page (default: 30, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[async_trait]
impl ToolExecutor for ListPullRequestReviews {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = QueryBuilder::new()
            .param("page", self.page)
            .param("per_page", clamp_per_page(self.per_page))
            .build();
        let endpoint = format!(
            "{}/pulls/{}/reviews{}",
            repo_path(&self.owner, &self.repo),
            self.pull_number,
            query
        );

        let mut reviews: Vec<Value> = ctx.github.get(&endpoint).await?;
        ctx.content
            .retain_safe(&mut reviews, &self.owner, &self.repo, rest_author_login)
            .await?;

        ToolOutput::json(&reviews)
    }
}

/// List review threads on a pull request
#[github_tool(
    name = "list_pull_request_review_threads",
    description = "List review threads on a pull request with their comments and resolution state",
    toolset = "pull_requests",
    operation = "read"
)]
pub struct ListPullRequestReviewThreads {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub pull_number: u64,
    /// Threads per page (default: 30, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Cursor from a previous page's `pageInfo.endCursor`
    #[serde(default)]
    pub after: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListPullRequestReviewThreads {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let variables = json!({
            "owner": self.owner,
            "repo": self.repo,
            "number": self.pull_number,
            "first": clamp_per_page(self.per_page),
            "after": self.after,
        });
        let mut data: Value = ctx.github.graphql(REVIEW_THREADS_QUERY, variables).await?;

        let mut threads = data
            .pointer_mut("/repository/pullRequest/reviewThreads")
            .map(Value::take)
            .filter(|t| !t.is_null())
            .ok_or_else(|| GitHubError::NotFound {
                resource: format!(
                    "pull request {}/{}#{}",
                    self.owner, self.repo, self.pull_number
                ),
            })?;

        filter_review_threads(&ctx.content, &self.owner, &self.repo, &mut threads).await?;
        ToolOutput::json_value(threads)
    }
}

/// Drop untrusted comments from a `reviewThreads` connection.
///
/// Each thread's `comments.totalCount` shrinks by the comments removed. A
/// thread left with no comments is dropped and the connection's `totalCount`
/// shrinks accordingly.
async fn filter_review_threads(
    content: &ContentFilter,
    owner: &str,
    repo: &str,
    connection: &mut Value,
) -> ToolResult<()> {
    if !content.is_enabled() {
        return Ok(());
    }

    let threads = match connection.get_mut("nodes").and_then(Value::as_array_mut) {
        Some(nodes) => std::mem::take(nodes),
        None => return Ok(()),
    };

    let mut kept = Vec::with_capacity(threads.len());
    let mut dropped = 0;
    for mut thread in threads {
        let removed = match thread
            .pointer_mut("/comments/nodes")
            .and_then(Value::as_array_mut)
        {
            Some(comments) => {
                content
                    .retain_safe(comments, owner, repo, graphql_author_login)
                    .await?
            }
            None => 0,
        };

        if removed > 0 {
            decrement_count(thread.pointer_mut("/comments/totalCount"), removed);
            let emptied = thread
                .pointer("/comments/nodes")
                .and_then(Value::as_array)
                .is_some_and(Vec::is_empty);
            if emptied {
                dropped += 1;
                continue;
            }
        }
        kept.push(thread);
    }

    if let Some(nodes) = connection.get_mut("nodes") {
        *nodes = Value::Array(kept);
    }
    if dropped > 0 {
        decrement_count(connection.get_mut("totalCount"), dropped);
    }
    Ok(())
}

fn decrement_count(count: Option<&mut Value>, by: usize) {
    if let Some(count) = count
        && let Some(n) = count.as_u64()
    {
        *count = json!(n.saturating_sub(by as u64));
    }
}

/// Open a pull request
#[github_tool(
    name = "create_pull_request",
    description = "Create a new pull request in a GitHub repository",
    toolset = "pull_requests",
    operation = "write"
)]
pub struct CreatePullRequest {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request title
    pub title: String,
    /// Branch containing the changes
    pub head: String,
    /// Branch to merge into
    pub base: String,
    /// Pull request description (Markdown)
    #[serde(default)]
    pub body: Option<String>,
    /// Open as a draft
    #[serde(default)]
    pub draft: Option<bool>,
    /// Allow maintainers to push to the head branch
    #[serde(default)]
    pub maintainer_can_modify: Option<bool>,
}

#[async_trait]
impl ToolExecutor for CreatePullRequest {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let mut body = json!({
            "title": self.title,
            "head": self.head,
            "base": self.base,
        });
        if let Some(text) = &self.body {
            body["body"] = json!(text);
        }
        if let Some(draft) = self.draft {
            body["draft"] = json!(draft);
        }
        if let Some(modify) = self.maintainer_can_modify {
            body["maintainer_can_modify"] = json!(modify);
        }

        let endpoint = format!("{}/pulls", repo_path(&self.owner, &self.repo));
        let pull: Value = ctx.github.post(&endpoint, &body).await?;
        ToolOutput::json_value(pull)
    }
}

/// Merge a pull request
#[github_tool(
    name = "merge_pull_request",
    description = "Merge a pull request using merge, squash or rebase",
    toolset = "pull_requests",
    operation = "write"
)]
pub struct MergePullRequest {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub pull_number: u64,
    /// Title of the merge commit
    #[serde(default)]
    pub commit_title: Option<String>,
    /// Extra detail for the merge commit
    #[serde(default)]
    pub commit_message: Option<String>,
    /// Merge method: merge, squash, or rebase
    #[serde(default)]
    pub merge_method: Option<String>,
}

#[async_trait]
impl ToolExecutor for MergePullRequest {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let mut body = json!({});
        if let Some(title) = &self.commit_title {
            body["commit_title"] = json!(title);
        }
        if let Some(message) = &self.commit_message {
            body["commit_message"] = json!(message);
        }
        if let Some(method) = &self.merge_method {
            if !matches!(method.as_str(), "merge" | "squash" | "rebase") {
                return Err(ToolError::InvalidArguments(format!(
                    "merge_method must be merge, squash, or rebase, got '{}'",
                    method
                )));
            }
            body["merge_method"] = json!(method);
        }

        let endpoint = format!(
            "{}/pulls/{}/merge",
            repo_path(&self.owner, &self.repo),
            self.pull_number
        );
        let result: Value = ctx.github.put(&endpoint, &body).await?;
        ToolOutput::json_value(result)
    }
}
