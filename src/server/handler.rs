//! MCP server handler
//!
//! Lists the tools enabled by the toolset filter and dispatches tool calls
//! with a per-request context.

use crate::config::AppConfig;
use crate::error::mcp_mapper::{is_protocol_error, map_tool_error};
use crate::github::GitHubClient;
use crate::lockdown::{ContentFilter, RepoAccessCache};
use crate::tools::{ContentBlock, ToolContext, ToolOutput, ToolRegistry, definitions};
use crate::toolsets::{ToolFilter, Toolset};
use rmcp::ErrorData as McpError;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, InitializeResult,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, Tool,
    ToolsCapability,
};
use rmcp::service::{RequestContext, RoleServer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// GitHub MCP server handler
///
/// Cheap to clone; the HTTP transport creates one per session and all of them
/// share the client, the registry and the access cache.
#[derive(Clone)]
pub struct OctoMcpHandler {
    name: String,
    version: String,
    registry: Arc<ToolRegistry>,
    github: Arc<GitHubClient>,
    filter: Arc<ToolFilter>,
    lockdown_mode: bool,
    repo_access: Option<Arc<RepoAccessCache>>,
}

impl OctoMcpHandler {
    /// `repo_access` must be provided when `config.lockdown.enabled` is set,
    /// otherwise every lockdown-filtered tool call fails.
    pub fn new(
        config: &AppConfig,
        github: Arc<GitHubClient>,
        repo_access: Option<Arc<RepoAccessCache>>,
    ) -> Self {
        let mut registry = ToolRegistry::new();
        definitions::register_all_tools(&mut registry);

        let filter = ToolFilter::new(&config.toolsets);

        info!(
            tools = registry.len(),
            lockdown = config.lockdown.enabled,
            read_only = filter.is_read_only(),
            "Initialized GitHub MCP handler"
        );

        Self {
            name: config.server.name.clone(),
            version: config.server.version.clone(),
            registry: Arc::new(registry),
            github,
            filter: Arc::new(filter),
            lockdown_mode: config.lockdown.enabled,
            repo_access,
        }
    }

    /// Number of registered tools, including hidden ones
    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_lockdown_enabled(&self) -> bool {
        self.lockdown_mode
    }

    fn create_context(&self, request_id: &str, ct: CancellationToken) -> ToolContext {
        let content = ContentFilter::new(self.lockdown_mode, self.repo_access.clone(), ct);
        ToolContext::new(self.github.clone(), self.filter.clone(), content, request_id)
    }

    fn to_mcp_result(output: ToolOutput) -> CallToolResult {
        let content = output
            .content
            .into_iter()
            .map(|ContentBlock::Text { text }| Content::text(text))
            .collect();

        CallToolResult {
            content,
            is_error: Some(output.is_error),
            meta: None,
            structured_content: None,
        }
    }

    /// Tools visible under the current toolset selection
    pub fn visible_tools(&self) -> Vec<Tool> {
        self.registry
            .tools()
            .filter(|tool| self.filter.is_visible(tool.toolset, tool.operation))
            .map(|tool| {
                let schema_value = serde_json::to_value(&tool.input_schema)
                    .unwrap_or_else(|_| serde_json::json!({}));

                let mut input_schema: Map<String, Value> = Map::new();
                input_schema.insert("type".to_string(), Value::String("object".to_string()));
                if let Some(props) = schema_value.get("properties") {
                    input_schema.insert("properties".to_string(), props.clone());
                }
                if let Some(required) = schema_value.get("required") {
                    input_schema.insert("required".to_string(), required.clone());
                }
                if let Some(defs) = schema_value.get("$defs") {
                    input_schema.insert("$defs".to_string(), defs.clone());
                }

                Tool {
                    name: Cow::Borrowed(tool.name),
                    description: Some(Cow::Borrowed(tool.description)),
                    input_schema: Arc::new(input_schema),
                    annotations: None,
                    icons: None,
                    meta: None,
                    output_schema: None,
                    title: None,
                }
            })
            .collect()
    }

    fn instructions(&self) -> String {
        let toolsets = Toolset::all()
            .iter()
            .filter(|t| self.filter.is_toolset_enabled(**t))
            .map(|t| format!("{} ({})", t, t.description()))
            .collect::<Vec<_>>()
            .join(", ");

        let mut text = format!("GitHub MCP server. Enabled toolsets: {}.", toolsets);
        if self.filter.is_read_only() {
            text.push_str(" Read-only mode: write tools are unavailable.");
        }
        if self.lockdown_mode {
            text.push_str(
                " Lockdown mode: content from authors without push access to a public \
                 repository is withheld.",
            );
        }
        text
    }

    /// Run a tool call.
    ///
    /// Malformed requests (unknown tool, bad arguments) become protocol
    /// errors; everything else is reported as a failed tool result.
    pub async fn execute_tool(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
        ct: CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        let request_id = format!("{:x}", rand::random::<u64>());
        let ctx = self.create_context(&request_id, ct);

        let args = arguments
            .map(Value::Object)
            .unwrap_or_else(|| serde_json::json!({}));

        match self.registry.execute(name, &ctx, args).await {
            Ok(output) => Ok(Self::to_mcp_result(output)),
            Err(e) if is_protocol_error(&e) => Err(map_tool_error(&e)),
            Err(e) => {
                error!(error = %e, request_id = %request_id, "Tool execution failed");
                Ok(CallToolResult {
                    content: vec![Content::text(format!("Error: {}", e))],
                    is_error: Some(true),
                    meta: None,
                    structured_content: None,
                })
            }
        }
    }
}

impl ServerHandler for OctoMcpHandler {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: self.name.clone(),
                version: self.version.clone(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(self.instructions()),
        }
    }

    #[instrument(skip(self, _request, _context))]
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        debug!("Listing tools");
        async move {
            Ok(ListToolsResult {
                tools: self.visible_tools(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    #[instrument(skip(self, context), fields(tool = %request.name))]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        debug!(?request.arguments, "Calling tool");
        async move {
            self.execute_tool(&request.name, request.arguments, context.ct)
                .await
        }
    }
}
