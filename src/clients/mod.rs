//! Generative-model client boundary.

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ChatMessage, GenerationConfig, ImageInput};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("GEMINI_API_KEY not configured; set it to enable model calls")]
    MissingApiKey,
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("model returned no candidates{}", block_suffix(.block_reason))]
    NoCandidates { block_reason: Option<String> },
    #[error("model response contained no text (finish reason: {0})")]
    NoText(String),
}

fn block_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" (blocked: {r})"))
        .unwrap_or_default()
}

/// The operations the tool host needs from a generative model.
///
/// Implementations are injected into tools as `Arc<dyn ModelClient>`, so
/// tests and alternative providers never touch process-wide state.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate_text(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, ModelError>;

    async fn analyze_image(&self, prompt: &str, image: &ImageInput) -> Result<String, ModelError>;

    /// Reply to a conversation whose last non-system turn is the user's.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<String, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_candidates_mentions_block_reason() {
        let e = ModelError::NoCandidates { block_reason: Some("SAFETY".into()) };
        assert_eq!(e.to_string(), "model returned no candidates (blocked: SAFETY)");
        let e = ModelError::NoCandidates { block_reason: None };
        assert_eq!(e.to_string(), "model returned no candidates");
    }
}
