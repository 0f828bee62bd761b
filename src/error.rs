//! Error types for octo-mcp
//!
//! This module defines the error hierarchy used throughout the application.
//! We use `thiserror` for library-style errors that are part of the API,
//! and convert to appropriate MCP error responses at the boundary.

pub mod mcp_mapper;

use std::sync::Arc;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("GitHub API error: {0}")]
    GitHub(#[from] GitHubError),

    #[error("Lockdown error: {0}")]
    Lockdown(#[from] LockdownError),

    #[error("Tool execution error: {0}")]
    Tool(#[from] ToolError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// GitHub API specific errors
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GraphQL query failed: {0}")]
    GraphQl(String),

    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized: invalid or expired token")]
    Unauthorized,

    #[error("Forbidden: insufficient permissions for {action}")]
    Forbidden { action: String },

    #[error("Invalid response from GitHub: {0}")]
    InvalidResponse(String),
}

impl GitHubError {
    /// Create an appropriate error from an HTTP status code and response body
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            401 => GitHubError::Unauthorized,
            // GitHub reports secondary rate limits as 403 with a message
            403 if body.to_ascii_lowercase().contains("rate limit") => {
                GitHubError::RateLimited { retry_after: 60 }
            }
            403 => GitHubError::Forbidden {
                action: "this operation".into(),
            },
            404 => GitHubError::NotFound {
                resource: "requested resource".into(),
            },
            429 => GitHubError::RateLimited { retry_after: 60 },
            _ => GitHubError::Api {
                status,
                message: if body.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.to_string()
                },
            },
        }
    }
}

/// Errors raised by the lockdown content-trust layer
#[derive(Error, Debug, Clone)]
pub enum LockdownError {
    /// Lockdown mode is on but no repository access cache was supplied
    #[error("lockdown mode is enabled but no repository access cache is configured")]
    NotConfigured,

    /// The permission lookup failed; shared by every caller waiting on it
    #[error("failed to verify author permissions: {0}")]
    Lookup(Arc<GitHubError>),

    /// The caller stopped waiting for the permission lookup
    #[error("permission lookup cancelled")]
    Cancelled,

    #[error("permission lookup aborted unexpectedly")]
    LookupPanicked,
}

/// Access control errors
#[derive(Error, Debug)]
#[error("Access denied for tool '{tool}': {reason}")]
pub struct AccessDeniedError {
    pub tool: String,
    pub reason: String,
}

impl AccessDeniedError {
    pub fn new(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn read_only(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: "write operations are not permitted in read-only mode".into(),
        }
    }

    pub fn toolset_disabled(tool: impl Into<String>, toolset: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: format!("toolset '{}' is not enabled", toolset.into()),
        }
    }
}

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("GitHub API error: {0}")]
    GitHub(#[from] GitHubError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(#[from] AccessDeniedError),

    #[error("Lockdown check failed: {0}")]
    Lockdown(#[from] LockdownError),

    #[error("access to {resource} is restricted by lockdown mode")]
    Restricted { resource: String },
}

impl ToolError {
    /// Content was withheld because its author is not trusted
    pub fn restricted(resource: impl Into<String>) -> Self {
        ToolError::Restricted {
            resource: resource.into(),
        }
    }
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authentication configured")]
    NotConfigured,

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Authentication failed: {0}")]
    Failed(String),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for tool operations
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Result type alias for GitHub API operations
pub type GitHubResult<T> = std::result::Result<T, GitHubError>;
