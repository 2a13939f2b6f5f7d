//! Tool host contents: the Gemini tools, the resources and the prompt
//! template, plus the wiring that registers them.

pub mod analyze_image;
pub mod chat;
pub mod generate_text;
pub mod prompts;
pub mod registry;
pub mod resources;

use std::sync::Arc;

use crate::clients::ModelClient;
use crate::core::error::HostError;
use crate::infra::store::ProfileStore;

pub use registry::ToolHost;

pub const HOST_NAME: &str = "Gemini MCP";

/// Register the fixed tool/resource/prompt set against the given
/// collaborators.
pub fn build_tool_host(
    model: Arc<dyn ModelClient>,
    profiles: Arc<dyn ProfileStore>,
    environment: impl Into<String>,
) -> Result<ToolHost, HostError> {
    let host = ToolHost::builder(HOST_NAME)
        .tool(Arc::new(generate_text::GenerateTextTool::new(model.clone())))?
        .tool(Arc::new(analyze_image::AnalyzeImageTool::new(model.clone())))?
        .tool(Arc::new(chat::ChatTool::new(model)))?
        .resource(Arc::new(resources::AppConfigResource::new(environment)))?
        .resource(Arc::new(resources::UserProfileResource::new(profiles)))?
        .prompt(Arc::new(prompts::AnalyzeDataPrompt))?
        .build();
    Ok(host)
}
