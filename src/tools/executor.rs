//! Tool execution types
//!
//! The context handed to every tool call, the output it produces, and the
//! traits each tool implements.

use crate::error::ToolError;
use crate::github::GitHubClient;
use crate::lockdown::ContentFilter;
use crate::toolsets::{OperationType, ToolFilter, Toolset};
// async_trait required for dyn-compatibility with the registry's type-erased handlers
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Per-call execution context
#[derive(Clone)]
pub struct ToolContext {
    /// GitHub API client
    pub github: Arc<GitHubClient>,
    /// Toolset and read-only filter
    pub filter: Arc<ToolFilter>,
    /// Lockdown gate for user-authored content
    pub content: ContentFilter,
    /// Correlation id for logs
    pub request_id: String,
}

impl ToolContext {
    pub fn new(
        github: Arc<GitHubClient>,
        filter: Arc<ToolFilter>,
        content: ContentFilter,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            github,
            filter,
            content,
            request_id: request_id.into(),
        }
    }
}

/// A piece of tool output
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text { text: String },
}

/// Result of a tool call
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub content: Vec<ContentBlock>,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Pretty-printed JSON of any serializable value
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        Ok(Self::text(serde_json::to_string_pretty(value)?))
    }

    pub fn json_value(value: Value) -> Result<Self, ToolError> {
        Self::json(&value)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Concatenated text of all blocks
    pub fn as_text(&self) -> String {
        self.content
            .iter()
            .map(|ContentBlock::Text { text }| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Static metadata of a tool, generated by `#[github_tool]`
pub trait ToolInfo {
    fn name() -> &'static str;
    fn description() -> &'static str;
    fn toolset() -> Toolset;
    fn operation_type() -> OperationType;
}

/// Tool behaviour
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError>;
}
