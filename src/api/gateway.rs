//! REST gateway in front of the tool host.
//!
//! This is the only layer that turns tool failures into HTTP responses.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value as J};
use thiserror::Error;

use crate::core::error::HostError;
use crate::core::mcp::{CallToolRequest, NO_RESULT_TEXT};
use crate::infra::http::json as http_json;
use crate::tools::ToolHost;

pub const SERVICE_NAME: &str = "NextJS-FastAPI-MCP-Gemini Integration";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Missing tool name")]
    MissingToolName,
    #[error("Error calling MCP tool: {0}")]
    ToolCall(#[from] HostError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidBody(_) | GatewayError::MissingToolName => StatusCode::BAD_REQUEST,
            GatewayError::ToolCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = status.as_u16(), error = %self, "tools/call failed");
        http_json::error(status, self.to_string()).into_response()
    }
}

pub async fn ping() -> Json<J> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

pub async fn list_tools(State(host): State<ToolHost>) -> Json<J> {
    Json(json!({ "tools": host.list_tools() }))
}

pub async fn list_resources(State(host): State<ToolHost>) -> Json<J> {
    Json(json!({ "resources": host.list_resources() }))
}

pub async fn list_prompts(State(host): State<ToolHost>) -> Json<J> {
    Json(json!({ "prompts": host.list_prompts() }))
}

/// The body is parsed as JSON whatever the `Content-Type` header says.
pub async fn call_tool(
    State(host): State<ToolHost>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let req: CallToolRequest =
        serde_json::from_slice(&body).map_err(|e| GatewayError::InvalidBody(e.to_string()))?;
    let name = req.params.tool_name().ok_or(GatewayError::MissingToolName)?;
    tracing::debug!(tool = name, id = ?req.id, "tools/call invoked");

    let items = host.call_tool(name, &req.params.arguments_or_empty()).await?;
    let text = items
        .first()
        .map(|item| item.to_text())
        .unwrap_or_else(|| NO_RESULT_TEXT.to_string());
    Ok(http_json::ok(text).into_response())
}
