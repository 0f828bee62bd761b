//! Context tools

use crate::error::ToolError;
use crate::tools::{ToolContext, ToolExecutor, ToolOutput, github_tool};
use async_trait::async_trait;
use serde_json::Value;

/// Details of the authenticated user
#[github_tool(
    name = "get_me",
    description = "Get details of the authenticated GitHub user, useful to know whose permissions tool calls run with",
    toolset = "context",
    operation = "read"
)]
pub struct GetMe {}

#[async_trait]
impl ToolExecutor for GetMe {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let user: Value = ctx.github.get("/user").await?;
        ToolOutput::json_value(user)
    }
}
