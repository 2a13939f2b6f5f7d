//! MCP server integration (Streamable HTTP + stdio) for gemini-mcp-gateway.
//!
//! - Bridges the in-process `ToolHost` onto rmcp's `ServerHandler`
//! - Mounted as a Streamable HTTP service under `/mcp`
//! - Served over stdio when `MODE=stdio`
//!
//! Descriptors are converted through their JSON wire form rather than by
//! building rmcp model structs field by field.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, GetPromptRequestParam, GetPromptResult,
        ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult, ListToolsResult,
        PaginatedRequestParam, PromptMessage, PromptMessageRole, ReadResourceRequestParam,
        ReadResourceResult, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    ErrorData as McpError, ServerHandler,
};

use crate::core::content::ContentItem;
use crate::core::error::HostError;
use crate::tools::ToolHost;

const INSTRUCTIONS: &str = "Gemini tools: generate_text, analyze_image, chat_with_gemini. \
Resources: config://app, users://{user_id}/profile. Prompt: analyze_data.";

/// The MCP server handler. Every request is answered from the shared
/// `ToolHost`, so the native protocol and the REST gateway see the same
/// registrations.
#[derive(Clone)]
pub struct GeminiMcpSvc {
    host: ToolHost,
}

impl GeminiMcpSvc {
    pub fn new(host: ToolHost) -> Self {
        Self { host }
    }
}

fn to_model<T: DeserializeOwned>(value: impl Serialize) -> Result<T, McpError> {
    serde_json::to_value(value)
        .and_then(serde_json::from_value)
        .map_err(|e| McpError::internal_error(format!("descriptor conversion failed: {e}"), None))
}

fn to_content(item: ContentItem) -> Content {
    match item {
        ContentItem::Text(text) => Content::text(text),
        ContentItem::Other(value) => serde_json::from_value(value.clone())
            .unwrap_or_else(|_| Content::text(value.to_string())),
    }
}

fn host_error(e: HostError) -> McpError {
    match e {
        HostError::UnknownResource(uri) => {
            McpError::resource_not_found(format!("Unknown resource: {uri}"), None)
        }
        e if e.is_caller_error() => McpError::invalid_params(e.to_string(), None),
        e => McpError::internal_error(e.to_string(), None),
    }
}

impl ServerHandler for GeminiMcpSvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self
            .host
            .list_tools()
            .into_iter()
            .map(to_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = %request.name, "mcp call_tool invoked");
        let args = request
            .arguments
            .map(JsonValue::Object)
            .unwrap_or_else(|| JsonValue::Object(Default::default()));
        match self.host.call_tool(&request.name, &args).await {
            Ok(items) => Ok(CallToolResult::success(
                items.into_iter().map(to_content).collect(),
            )),
            Err(e @ HostError::UnknownTool(_)) => Err(host_error(e)),
            Err(e) => {
                tracing::warn!(tool = %request.name, error = %e, "mcp call_tool failed");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = self
            .host
            .list_resources()
            .into_iter()
            .filter(|r| r.uri.is_some())
            .map(to_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        let templates = self
            .host
            .list_resources()
            .into_iter()
            .filter(|r| r.uri_template.is_some())
            .map(to_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListResourceTemplatesResult::with_all_items(templates))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let body = self.host.read_resource(&request.uri).await.map_err(host_error)?;
        let contents = to_model(json!({
            "uri": body.uri,
            "mimeType": body.mime_type,
            "text": body.text,
        }))?;
        Ok(ReadResourceResult { contents: vec![contents] })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        let prompts = self
            .host
            .list_prompts()
            .into_iter()
            .map(to_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListPromptsResult::with_all_items(prompts))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        let args = request.arguments.map(JsonValue::Object).unwrap_or_default();
        let text = self.host.get_prompt(&request.name, &args).map_err(host_error)?;
        let description = self
            .host
            .list_prompts()
            .into_iter()
            .find(|p| p.name == request.name)
            .map(|p| p.description.to_string());
        Ok(GetPromptResult {
            description,
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}
