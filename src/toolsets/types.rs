//! Toolset types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named group of tools that is enabled or disabled as a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toolset {
    Context,
    Repos,
    Issues,
    PullRequests,
    Projects,
    CodeSecurity,
    Dependabot,
    SecretProtection,
}

impl Toolset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Toolset::Context => "context",
            Toolset::Repos => "repos",
            Toolset::Issues => "issues",
            Toolset::PullRequests => "pull_requests",
            Toolset::Projects => "projects",
            Toolset::CodeSecurity => "code_security",
            Toolset::Dependabot => "dependabot",
            Toolset::SecretProtection => "secret_protection",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.as_str() == s)
    }

    pub fn all() -> &'static [Toolset] {
        &[
            Toolset::Context,
            Toolset::Repos,
            Toolset::Issues,
            Toolset::PullRequests,
            Toolset::Projects,
            Toolset::CodeSecurity,
            Toolset::Dependabot,
            Toolset::SecretProtection,
        ]
    }

    /// Short human-readable summary, used in server instructions
    pub fn description(&self) -> &'static str {
        match self {
            Toolset::Context => "information about the authenticated user",
            Toolset::Repos => "repository contents, branches and search",
            Toolset::Issues => "issues and issue comments",
            Toolset::PullRequests => "pull requests, reviews and review comments",
            Toolset::Projects => "GitHub Projects",
            Toolset::CodeSecurity => "code scanning alerts",
            Toolset::Dependabot => "Dependabot alerts",
            Toolset::SecretProtection => "secret scanning alerts",
        }
    }
}

impl fmt::Display for Toolset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operation type for determining read vs write access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// get, list, search
    Read,
    /// create, update, comment, merge
    Write,
}

impl OperationType {
    pub const fn is_read_only(&self) -> bool {
        matches!(self, OperationType::Read)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationType::Read => "read",
            OperationType::Write => "write",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
