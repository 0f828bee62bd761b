//! Toolset filter
//!
//! Decides which registered tools are exposed to the client.

use crate::config::ToolsetsConfig;
use crate::error::AccessDeniedError;
use crate::toolsets::types::{OperationType, Toolset};
use std::collections::HashSet;
use tracing::debug;

/// Resolved toolset selection
#[derive(Debug, Clone)]
pub struct ToolFilter {
    enabled: HashSet<Toolset>,
    read_only: bool,
}

impl ToolFilter {
    /// Build from configuration. Unknown names are skipped here; the config
    /// loader rejects them before this point.
    pub fn new(config: &ToolsetsConfig) -> Self {
        let enabled = if config.enabled.iter().any(|name| name == "all") {
            Toolset::all().iter().copied().collect()
        } else {
            config
                .enabled
                .iter()
                .filter_map(|name| Toolset::try_parse(name))
                .collect()
        };

        debug!(?enabled, read_only = config.read_only, "Resolved toolsets");

        Self {
            enabled,
            read_only: config.read_only,
        }
    }

    /// Every toolset enabled, writes allowed
    pub fn allow_all() -> Self {
        Self::new(&ToolsetsConfig::default())
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_toolset_enabled(&self, toolset: Toolset) -> bool {
        self.enabled.contains(&toolset)
    }

    /// Whether the tool shows up in `list_tools`
    pub fn is_visible(&self, toolset: Toolset, operation: OperationType) -> bool {
        self.check("", toolset, operation).is_ok()
    }

    /// Refuse tools from disabled toolsets and writes in read-only mode
    pub fn check(
        &self,
        tool_name: &str,
        toolset: Toolset,
        operation: OperationType,
    ) -> Result<(), AccessDeniedError> {
        if !self.is_toolset_enabled(toolset) {
            return Err(AccessDeniedError::toolset_disabled(tool_name, toolset.as_str()));
        }
        if self.read_only && !operation.is_read_only() {
            return Err(AccessDeniedError::read_only(tool_name));
        }
        Ok(())
    }
}

impl Default for ToolFilter {
    fn default() -> Self {
        Self::allow_all()
    }
}
