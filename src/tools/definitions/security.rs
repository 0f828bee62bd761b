//! Code scanning, Dependabot and secret scanning alert tools

use super::{clamp_per_page, default_page, default_per_page, repo_path};
use crate::error::ToolError;
use crate::tools::{ToolContext, ToolExecutor, ToolOutput, github_tool};
use crate::util::QueryBuilder;
use async_trait::async_trait;
use serde_json::Value;

/// List code scanning alerts
#[github_tool(
    name = "list_code_scanning_alerts",
    description = "List code scanning alerts in a GitHub repository",
    toolset = "code_security",
    operation = "read"
)]
pub struct ListCodeScanningAlerts {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Filter by state: open, closed, dismissed, or fixed
    #[serde(default)]
    pub state: Option<String>,
    /// Git ref the alerts were found on
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
    /// Filter by severity: critical, high, medium, low, warning, note, or error
    #[serde(default)]
    pub severity: Option<String>,
    /// Filter by the name of the scanning tool
    #[serde(default)]
    pub tool_name: Option<String>,
    /// Page number (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page (default: 30, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[async_trait]
impl ToolExecutor for ListCodeScanningAlerts {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = QueryBuilder::new()
            .optional("state", self.state.as_ref())
            .optional("ref", self.git_ref.as_ref())
            .optional("severity", self.severity.as_ref())
            .optional("tool_name", self.tool_name.as_ref())
            .param("page", self.page)
            .param("per_page", clamp_per_page(self.per_page))
            .build();

        let endpoint = format!(
            "{}/code-scanning/alerts{}",
            repo_path(&self.owner, &self.repo),
            query
        );
        let alerts: Value = ctx.github.get(&endpoint).await?;
        ToolOutput::json_value(alerts)
    }
}

/// Get a code scanning alert
#[github_tool(
    name = "get_code_scanning_alert",
    description = "Get details of a specific code scanning alert",
    toolset = "code_security",
    operation = "read"
)]
pub struct GetCodeScanningAlert {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Alert number
    pub alert_number: u64,
}

#[async_trait]
impl ToolExecutor for GetCodeScanningAlert {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let endpoint = format!(
            "{}/code-scanning/alerts/{}",
            repo_path(&self.owner, &self.repo),
            self.alert_number
        );
        let alert: Value = ctx.github.get(&endpoint).await?;
        ToolOutput::json_value(alert)
    }
}

/// List Dependabot alerts
#[github_tool(
    name = "list_dependabot_alerts",
    description = "List Dependabot alerts in a GitHub repository",
    toolset = "dependabot",
    operation = "read"
)]
pub struct ListDependabotAlerts {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Comma-separated states: auto_dismissed, dismissed, fixed, open
    #[serde(default)]
    pub state: Option<String>,
    /// Comma-separated severities: low, medium, high, critical
    #[serde(default)]
    pub severity: Option<String>,
    /// Results per page (default: 30, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[async_trait]
impl ToolExecutor for ListDependabotAlerts {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = QueryBuilder::new()
            .optional("state", self.state.as_ref())
            .optional("severity", self.severity.as_ref())
            .param("per_page", clamp_per_page(self.per_page))
            .build();

        let endpoint = format!(
            "{}/dependabot/alerts{}",
            repo_path(&self.owner, &self.repo),
            query
        );
        let alerts: Value = ctx.github.get(&endpoint).await?;
        ToolOutput::json_value(alerts)
    }
}

/// Get a Dependabot alert
#[github_tool(
    name = "get_dependabot_alert",
    description = "Get details of a specific Dependabot alert",
    toolset = "dependabot",
    operation = "read"
)]
pub struct GetDependabotAlert {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Alert number
    pub alert_number: u64,
}

#[async_trait]
impl ToolExecutor for GetDependabotAlert {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let endpoint = format!(
            "{}/dependabot/alerts/{}",
            repo_path(&self.owner, &self.repo),
            self.alert_number
        );
        let alert: Value = ctx.github.get(&endpoint).await?;
        ToolOutput::json_value(alert)
    }
}

/// List secret scanning alerts
#[github_tool(
    name = "list_secret_scanning_alerts",
    description = "List secret scanning alerts in a GitHub repository",
    toolset = "secret_protection",
    operation = "read"
)]
pub struct ListSecretScanningAlerts {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Filter by state: open or resolved
    #[serde(default)]
    pub state: Option<String>,
    /// Comma-separated secret types
    #[serde(default)]
    pub secret_type: Option<String>,
    /// Comma-separated resolutions: false_positive, wont_fix, revoked, used_in_tests
    #[serde(default)]
    pub resolution: Option<String>,
    /// Page number (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page (default: 30, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[async_trait]
impl ToolExecutor for ListSecretScanningAlerts {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = QueryBuilder::new()
            .optional("state", self.state.as_ref())
            .optional("secret_type", self.secret_type.as_ref())
            .optional("resolution", self.resolution.as_ref())
            .param("page", self.page)
            .param("per_page", clamp_per_page(self.per_page))
            .build();

        let endpoint = format!(
            "{}/secret-scanning/alerts{}",
            repo_path(&self.owner, &self.repo),
            query
        );
        let alerts: Value = ctx.github.get(&endpoint).await?;
        ToolOutput::json_value(alerts)
    }
}
