//! MCP error code mapping.
//!
//! Maps application errors to MCP protocol errors with appropriate JSON-RPC error codes.
//!
//! # Strategy
//! - Protocol-level errors (tool not found, invalid params) → `Err(McpError)`
//! - Tool execution errors → `Ok(CallToolResult { is_error: true })`
//!
//! Lockdown restrictions and failed permission lookups are execution errors:
//! the agent sees a failed tool call and no content.

use rmcp::ErrorData as McpError;
use rmcp::model::ErrorCode;
use serde_json::json;
use std::borrow::Cow;

use super::{GitHubError, ToolError};

/// Returns `true` when the error is a problem with the request itself and
/// should be reported as a protocol error rather than a failed tool call.
pub fn is_protocol_error(error: &ToolError) -> bool {
    matches!(
        error,
        ToolError::NotFound(_)
            | ToolError::InvalidArguments(_)
            | ToolError::MissingArgument(_)
            | ToolError::Serialization(_)
    )
}

/// Maps a `ToolError` to an MCP protocol error.
pub fn map_tool_error(error: &ToolError) -> McpError {
    match error {
        ToolError::NotFound(name) => McpError {
            code: ErrorCode::METHOD_NOT_FOUND,
            message: Cow::Owned(format!("Tool '{}' not found", name)),
            data: Some(json!({
                "tool": name,
                "error_type": "ToolNotFound"
            })),
        },

        ToolError::InvalidArguments(msg) => McpError {
            code: ErrorCode::INVALID_PARAMS,
            message: Cow::Owned(msg.clone()),
            data: Some(json!({
                "error_type": "InvalidArguments"
            })),
        },

        ToolError::MissingArgument(arg) => McpError {
            code: ErrorCode::INVALID_PARAMS,
            message: Cow::Owned(format!("Missing required argument: {}", arg)),
            data: Some(json!({
                "argument": arg,
                "error_type": "MissingArgument"
            })),
        },

        ToolError::Serialization(e) => McpError {
            code: ErrorCode::INVALID_PARAMS,
            message: Cow::Owned(format!("Invalid argument format: {}", e)),
            data: Some(json!({
                "error_type": "SerializationError"
            })),
        },

        ToolError::ExecutionFailed(msg) => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Owned(msg.clone()),
            data: Some(json!({
                "error_type": "ExecutionFailed"
            })),
        },

        ToolError::GitHub(github_err) => map_github_error(github_err),

        ToolError::AccessDenied(access_err) => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Owned(access_err.to_string()),
            data: Some(json!({
                "error_type": "AccessDenied",
                "tool": access_err.tool,
                "reason": access_err.reason
            })),
        },

        ToolError::Lockdown(lockdown_err) => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Owned(lockdown_err.to_string()),
            data: Some(json!({
                "error_type": "LockdownError"
            })),
        },

        ToolError::Restricted { resource } => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Owned(error.to_string()),
            data: Some(json!({
                "error_type": "RestrictedContent",
                "resource": resource
            })),
        },
    }
}

/// Maps a `GitHubError` to an MCP protocol error.
pub fn map_github_error(error: &GitHubError) -> McpError {
    match error {
        GitHubError::Unauthorized => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Borrowed("GitHub authentication failed"),
            data: Some(json!({
                "error_type": "Unauthorized",
                "hint": "Check that your GitHub token is valid and not expired"
            })),
        },

        GitHubError::Forbidden { action } => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Owned(format!(
                "Forbidden: insufficient permissions for {}",
                action
            )),
            data: Some(json!({
                "error_type": "Forbidden",
                "action": action
            })),
        },

        GitHubError::NotFound { resource } => McpError {
            code: ErrorCode::RESOURCE_NOT_FOUND,
            message: Cow::Owned(format!("Resource not found: {}", resource)),
            data: Some(json!({
                "error_type": "NotFound",
                "resource": resource
            })),
        },

        GitHubError::RateLimited { retry_after } => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Owned(format!("Rate limited, retry after {} seconds", retry_after)),
            data: Some(json!({
                "error_type": "RateLimited",
                "retry_after": retry_after
            })),
        },

        GitHubError::Api { status, message } => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Owned(format!("GitHub API error (HTTP {}): {}", status, message)),
            data: Some(json!({
                "error_type": "ApiError",
                "status": status
            })),
        },

        GitHubError::GraphQl(message) => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Owned(format!("GraphQL query failed: {}", message)),
            data: Some(json!({
                "error_type": "GraphQlError"
            })),
        },

        GitHubError::Request(e) => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Owned(format!("HTTP request failed: {}", e)),
            data: Some(json!({
                "error_type": "RequestError"
            })),
        },

        GitHubError::InvalidResponse(msg) => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Owned(format!("Invalid response from GitHub: {}", msg)),
            data: Some(json!({
                "error_type": "InvalidResponse"
            })),
        },
    }
}

/// Creates an MCP error for an internal server error.
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::Owned(message.into()),
        data: Some(json!({
            "error_type": "InternalError"
        })),
    }
}
