//! rmcp `ServerHandler` over the tool and resource registries.

use crate::error::ServerError;
use keeper_rs_tools::{ResourceRegistry, ToolContext, ToolRegistry, ToolServices, ToolSpec};
use log::{debug, info, warn};
use rmcp::model::{
    AnnotateAble, CallToolRequestParam, CallToolResult, Content, ErrorData, Implementation,
    JsonObject, ListResourcesResult, ListToolsResult, PaginatedRequestParam, RawResource,
    ReadResourceRequestParam, ReadResourceResult, Resource, ResourceContents,
    ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use serde_json::Value;
use std::sync::Arc;

const INSTRUCTIONS: &str = "Keeper stores experience memories and coding rules. \
Search them with search_memories and search_rules before starting a task, record \
lessons with store_memory, and maintain conventions with the rule tools. \
Snapshots are available as the keeper://memories, keeper://rules and \
keeper://rules/categories resources.";

/// MCP server dispatching to registered tools and resources.
#[derive(Clone)]
pub struct KeeperMcpServer {
    tools: ToolRegistry,
    resources: ResourceRegistry,
    services: Arc<ToolServices>,
}

impl KeeperMcpServer {
    pub fn new(tools: ToolRegistry, resources: ResourceRegistry, services: ToolServices) -> Self {
        Self {
            tools,
            resources,
            services: Arc::new(services),
        }
    }

    /// Tool descriptors in name order.
    pub fn tool_descriptors(&self) -> Vec<Tool> {
        self.tools.specs().into_iter().map(tool_descriptor).collect()
    }

    /// Resource descriptors in URI order.
    pub fn resource_descriptors(&self) -> Vec<Resource> {
        self.resources
            .specs()
            .into_iter()
            .map(|spec| {
                let mut raw = RawResource::new(spec.uri, spec.name);
                raw.description = Some(spec.description);
                raw.mime_type = Some(spec.mime_type);
                raw.no_annotation()
            })
            .collect()
    }

    /// Run one tool call.
    ///
    /// An unknown tool is a protocol error; a failing tool is reported as an
    /// error result so the session continues.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let Some(tool) = self.tools.get(name) else {
            warn!("unknown tool requested (name={name})");
            return Err(ErrorData::invalid_params(
                format!("tool not found: {name}"),
                None,
            ));
        };
        let args = Value::Object(arguments.unwrap_or_default());
        let mut ctx = ToolContext::new(self.services.clone());
        match ctx.execute_tool(tool.as_ref(), args).await {
            Ok(value) => {
                let text = serde_json::to_string_pretty(&value)
                    .map_err(|err| ErrorData::internal_error(err.to_string(), None))?;
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(err) => Ok(CallToolResult::error(vec![Content::text(err.to_string())])),
        }
    }

    /// Render a resource by URI.
    pub async fn read(&self, uri: &str) -> Result<ReadResourceResult, ErrorData> {
        let Some(resource) = self.resources.get(uri) else {
            return Err(ErrorData::resource_not_found(
                format!("resource not found: {uri}"),
                None,
            ));
        };
        let ctx = ToolContext::new(self.services.clone());
        let text = resource
            .read(&ctx)
            .await
            .map_err(|err| ErrorData::internal_error(err.to_string(), None))?;
        debug!("resource read (uri={uri}, bytes={})", text.len());
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}

fn tool_descriptor(spec: ToolSpec) -> Tool {
    let schema = match spec.args_schema {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    Tool::new(spec.name, spec.description, Arc::new(schema))
}

impl ServerHandler for KeeperMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder()
            .enable_tools()
            .enable_resources()
            .build();
        info.server_info = Implementation::from_build_env();
        info.instructions = Some(INSTRUCTIONS.to_string());
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tool_descriptors()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.dispatch(&request.name, request.arguments).await
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(
            self.resource_descriptors(),
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        self.read(&request.uri).await
    }
}

/// Serve on stdin/stdout until the client disconnects.
pub async fn run_stdio_server(server: KeeperMcpServer) -> Result<(), ServerError> {
    info!(
        "starting MCP server on stdio (tools={}, workspace={})",
        server.tools.len(),
        server.services.workspace_root.display()
    );
    let service = server
        .serve(stdio())
        .await
        .map_err(|err| ServerError::Transport(err.to_string()))?;
    let reason = service
        .waiting()
        .await
        .map_err(|err| ServerError::Transport(err.to_string()))?;
    info!("MCP server stopped (reason={reason:?})");
    Ok(())
}
