//! Tool registry
//!
//! Holds every tool discovered at startup with its metadata and input schema,
//! and dispatches calls after the toolset filter has approved them.

use crate::error::ToolError;
use crate::tools::executor::{ToolContext, ToolExecutor, ToolInfo, ToolOutput};
use crate::toolsets::{OperationType, Toolset};
// async_trait required for dyn-compatibility with Box<dyn ToolHandler>
use async_trait::async_trait;
use schemars::Schema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Compile-time registration entry submitted by `#[github_tool]`
pub struct ToolRegistration {
    pub register_fn: fn(&mut ToolRegistry),
}

inventory::collect!(ToolRegistration);

/// A registered tool with all its metadata
pub struct RegisteredTool {
    pub name: &'static str,
    pub description: &'static str,
    pub toolset: Toolset,
    pub operation: OperationType,
    /// JSON Schema of the tool's arguments
    pub input_schema: Schema,
    handler: Box<dyn ToolHandler>,
}

#[async_trait]
trait ToolHandler: Send + Sync {
    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolOutput, ToolError>;
}

struct TypedToolHandler<T> {
    _marker: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T> ToolHandler for TypedToolHandler<T>
where
    T: ToolExecutor + DeserializeOwned + 'static,
{
    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolOutput, ToolError> {
        let tool: T = serde_json::from_value(args).map_err(|e| {
            ToolError::InvalidArguments(format!("Failed to parse arguments: {}", e))
        })?;
        tool.execute(ctx).await
    }
}

/// Tool registry, ordered by tool name
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register<T>(&mut self)
    where
        T: ToolExecutor + DeserializeOwned + schemars::JsonSchema + ToolInfo + 'static,
    {
        let name = T::name();
        let toolset = T::toolset();

        let tool = RegisteredTool {
            name,
            description: T::description(),
            toolset,
            operation: T::operation_type(),
            input_schema: schemars::schema_for!(T),
            handler: Box::new(TypedToolHandler::<T> {
                _marker: PhantomData,
            }),
        };

        if self.tools.insert(name, tool).is_some() {
            warn!(name, "Tool registered twice, keeping the last definition");
        }
        debug!(name, toolset = %toolset, "Registered tool");
    }

    /// Register every tool declared with `#[github_tool]`
    pub fn register_all_auto(&mut self) {
        for registration in inventory::iter::<ToolRegistration> {
            (registration.register_fn)(self);
        }
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().copied()
    }

    pub fn tools(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.values()
    }

    pub fn tools_in_toolset(&self, toolset: Toolset) -> Vec<&RegisteredTool> {
        self.tools
            .values()
            .filter(|tool| tool.toolset == toolset)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Check the tool against the context's filter, then run it
    #[instrument(skip(self, ctx, args), fields(tool = %name, request_id = %ctx.request_id))]
    pub async fn execute(
        &self,
        name: &str,
        ctx: &ToolContext,
        args: Value,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        if let Err(denied) = ctx.filter.check(name, tool.toolset, tool.operation) {
            warn!(reason = %denied.reason, "Access denied to tool");
            return Err(denied.into());
        }

        let start = Instant::now();
        let result = tool.handler.call(ctx, args).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => info!(elapsed_ms, "Tool call completed"),
            Err(e) => warn!(elapsed_ms, error = %e, "Tool call failed"),
        }

        result
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
