use std::time::Instant;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::audit::AuditLog;
use crate::tools::{ToolSet, catalogue};

/// MCP request handler exposing the Texterify tools.
#[derive(Clone)]
pub struct TexterifyServer {
    tools: ToolSet,
    audit: Option<AuditLog>,
}

impl TexterifyServer {
    pub fn new(tools: ToolSet, audit: Option<AuditLog>) -> Self {
        Self { tools, audit }
    }

    fn server_info(&self) -> ServerInfo {
        let capabilities = ServerCapabilities::builder().enable_tools().build();

        let instructions = match self.tools.default_project_id() {
            Some(project) => format!(
                "Texterify translation management. Tools default to project {project}; pass project_id to use another one."
            ),
            None => "Texterify translation management. No default project is configured; pass project_id \
                     to every tool except list_projects."
                .to_string(),
        };

        ServerInfo {
            capabilities,
            server_info: Implementation {
                name: "texterify-mcp".to_string(),
                title: Some("Texterify MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(instructions),
            ..Default::default()
        }
    }

    /// Run a tool call, recording it in the audit log when one is configured.
    pub async fn handle_call(&self, params: CallToolRequestParam) -> Result<CallToolResult, McpError> {
        let call_id = Uuid::new_v4().to_string();
        let tool_name = params.name.to_string();
        debug!(%call_id, tool = %tool_name, "tool call received");

        if let Some(audit) = &self.audit {
            if let Err(err) = audit.tool_request(&call_id, &tool_name, params.arguments.as_ref()).await
            {
                warn!(error = ?err, "failed to write audit record");
            }
        }

        let started = Instant::now();
        let outcome = self.tools.call(&tool_name, params.arguments).await;
        let elapsed = started.elapsed();

        match &outcome {
            Ok(result) => {
                let failed = result.is_error.unwrap_or(false);
                info!(%call_id, tool = %tool_name, failed, elapsed_ms = elapsed.as_millis() as u64, "tool call finished");
            }
            Err(err) => {
                warn!(%call_id, tool = %tool_name, error = %err.message, "tool call rejected");
            }
        }

        if let Some(audit) = &self.audit {
            let written = match &outcome {
                Ok(result) => audit.tool_response(&call_id, &tool_name, elapsed, result).await,
                Err(err) => audit.tool_rejected(&call_id, &tool_name, elapsed, err).await,
            };
            if let Err(err) = written {
                warn!(error = ?err, "failed to write audit record");
            }
        }

        outcome
    }
}

impl ServerHandler for TexterifyServer {
    fn get_info(&self) -> ServerInfo {
        self.server_info()
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(catalogue()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.handle_call(request).await
    }
}
