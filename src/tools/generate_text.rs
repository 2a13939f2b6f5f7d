use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::clients::ModelClient;
use crate::core::content::ContentItem;
use crate::core::error::HostError;
use crate::core::tool::{parse_args, Tool, ToolSpec};
use crate::domain::{GenerationConfig, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

#[derive(Clone)]
pub struct GenerateTextTool {
    model: Arc<dyn ModelClient>,
}

impl GenerateTextTool {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }
}

#[derive(Deserialize)]
struct GenerateTextArgs {
    prompt: String,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    max_tokens: Option<u32>,
}

impl ToolSpec for GenerateTextTool {
    fn name(&self) -> &'static str {
        "generate_text"
    }
    fn description(&self) -> &'static str {
        "Generate text using Google's Gemini API."
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string" },
                "temperature": { "type": "number", "default": DEFAULT_TEMPERATURE },
                "max_tokens": { "type": "integer", "default": DEFAULT_MAX_TOKENS }
            },
            "required": ["prompt"]
        })
    }
}

#[async_trait]
impl Tool for GenerateTextTool {
    async fn call(&self, arguments: &serde_json::Value) -> Result<Vec<ContentItem>, HostError> {
        let args: GenerateTextArgs = parse_args(arguments)?;
        let config = GenerationConfig {
            temperature: Some(args.temperature.unwrap_or(DEFAULT_TEMPERATURE as f32)),
            max_output_tokens: Some(args.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
        };
        let text = self.model.generate_text(&args.prompt, &config).await?;
        Ok(vec![ContentItem::Text(text)])
    }
}
