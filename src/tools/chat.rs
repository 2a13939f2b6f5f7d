use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::clients::ModelClient;
use crate::core::content::ContentItem;
use crate::core::error::HostError;
use crate::core::tool::{parse_args, Tool, ToolSpec};
use crate::domain::{ChatMessage, ChatRole, GenerationConfig, DEFAULT_TEMPERATURE};

/// Multi-turn chat. The whole conversation is replayed in order, assistant
/// turns included, and the reply to the final user turn is returned.
#[derive(Clone)]
pub struct ChatTool {
    model: Arc<dyn ModelClient>,
}

impl ChatTool {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }
}

#[derive(Deserialize)]
struct ChatArgs {
    messages: Vec<ChatMessage>,
    #[serde(default)]
    temperature: Option<f32>,
}

/// The last non-system turn must exist and be the user's.
fn check_conversation(messages: &[ChatMessage]) -> Result<(), HostError> {
    match messages.iter().rev().find(|m| m.role != ChatRole::System) {
        None => Err(HostError::EmptyConversation),
        Some(m) if m.role != ChatRole::User => Err(HostError::TrailingAssistantTurn),
        Some(_) => Ok(()),
    }
}

impl ToolSpec for ChatTool {
    fn name(&self) -> &'static str {
        "chat_with_gemini"
    }
    fn description(&self) -> &'static str {
        "Have a multi-turn conversation with Gemini."
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "messages": {
                    "type": "array",
                    "description": "List of message objects with 'role' and 'content' keys",
                    "items": {
                        "type": "object",
                        "properties": {
                            "role": { "type": "string", "enum": ["user", "assistant", "model", "system"] },
                            "content": { "type": "string" }
                        },
                        "required": ["role", "content"]
                    }
                },
                "temperature": {
                    "type": "number",
                    "default": DEFAULT_TEMPERATURE,
                    "description": "Controls randomness (0.0 to 1.0)"
                }
            },
            "required": ["messages"]
        })
    }
}

#[async_trait]
impl Tool for ChatTool {
    async fn call(&self, arguments: &serde_json::Value) -> Result<Vec<ContentItem>, HostError> {
        let args: ChatArgs = parse_args(arguments)?;
        check_conversation(&args.messages)?;
        let config = GenerationConfig {
            temperature: Some(args.temperature.unwrap_or(DEFAULT_TEMPERATURE as f32)),
            max_output_tokens: None,
        };
        let text = self.model.chat(&args.messages, &config).await?;
        Ok(vec![ContentItem::Text(text)])
    }
}
