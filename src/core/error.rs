use thiserror::Error;

use crate::clients::ModelError;

/// Failures raised by tools, resources and prompts.
///
/// The tool host never swallows these; the gateway and the MCP bridge are
/// the only places they get translated for a caller.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Unknown resource: {0}")]
    UnknownResource(String),
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),
    #[error("duplicate registration: {0}")]
    Duplicate(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("unsupported image data: {0}")]
    Image(#[from] image::ImageError),
    #[error("chat requires at least one user message")]
    EmptyConversation,
    #[error("last chat message must come from the user")]
    TrailingAssistantTurn,
    #[error("failed to encode resource: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl HostError {
    pub fn invalid_arguments(e: impl std::fmt::Display) -> Self {
        HostError::InvalidArguments(e.to_string())
    }

    /// True when the caller sent something unusable, as opposed to an
    /// upstream or internal failure.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            HostError::UnknownTool(_)
                | HostError::UnknownResource(_)
                | HostError::UnknownPrompt(_)
                | HostError::InvalidArguments(_)
        )
    }
}
