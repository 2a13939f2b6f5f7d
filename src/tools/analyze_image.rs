use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;

use crate::clients::ModelClient;
use crate::core::content::ContentItem;
use crate::core::error::HostError;
use crate::core::tool::{parse_args, Tool, ToolSpec};
use crate::domain::ImageInput;

#[derive(Clone)]
pub struct AnalyzeImageTool {
    model: Arc<dyn ModelClient>,
}

impl AnalyzeImageTool {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }
}

#[derive(Deserialize)]
struct AnalyzeImageArgs {
    image_data: String,
    prompt: String,
}

/// Decode a base64 payload (optionally a `data:` URL) into a verified image.
pub fn decode_image(image_data: &str) -> Result<ImageInput, HostError> {
    let payload = match image_data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, b64)| b64).unwrap_or(rest),
        None => image_data,
    };
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    let format = image::guess_format(&bytes)?;
    image::load_from_memory_with_format(&bytes, format)?;
    Ok(ImageInput { bytes, mime_type: format.to_mime_type() })
}

impl ToolSpec for AnalyzeImageTool {
    fn name(&self) -> &'static str {
        "analyze_image"
    }
    fn description(&self) -> &'static str {
        "Analyze an image using Gemini's multimodal capabilities."
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "image_data": { "type": "string", "description": "Base64 encoded image data" },
                "prompt": { "type": "string", "description": "Text prompt describing what to analyze in the image" }
            },
            "required": ["image_data", "prompt"]
        })
    }
}

#[async_trait]
impl Tool for AnalyzeImageTool {
    async fn call(&self, arguments: &serde_json::Value) -> Result<Vec<ContentItem>, HostError> {
        let args: AnalyzeImageArgs = parse_args(arguments)?;
        let image = decode_image(&args.image_data)?;
        tracing::debug!(mime_type = image.mime_type, bytes = image.bytes.len(), "analyze_image decoded payload");
        let text = self.model.analyze_image(&args.prompt, &image).await?;
        Ok(vec![ContentItem::Text(text)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{tiny_png, ModelCall, StubModel};

    #[tokio::test]
    async fn sends_decoded_image_and_prompt() {
        let stub = Arc::new(StubModel::replying("a black pixel"));
        let tool = AnalyzeImageTool::new(stub.clone());
        let png = tiny_png();
        let out = tool
            .call(&json!({"image_data": STANDARD.encode(&png), "prompt": "describe"}))
            .await
            .unwrap();
        assert_eq!(out[0].to_text(), "a black pixel");
        assert_eq!(
            stub.calls(),
            vec![ModelCall::Image {
                prompt: "describe".into(),
                image: ImageInput { bytes: png, mime_type: "image/png" },
            }]
        );
    }

    #[test]
    fn accepts_data_url_prefix() {
        let encoded = format!("data:image/png;base64,{}", STANDARD.encode(tiny_png()));
        let img = decode_image(&encoded).unwrap();
        assert_eq!(img.mime_type, "image/png");
    }

    #[tokio::test]
    async fn non_base64_is_a_decode_error() {
        let stub = Arc::new(StubModel::replying("never"));
        let tool = AnalyzeImageTool::new(stub.clone());
        let err = tool
            .call(&json!({"image_data": "not base64 at all!!", "prompt": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, HostError::Decode(_)), "got {err}");
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn valid_base64_of_non_image_is_an_image_error() {
        let err = decode_image(&STANDARD.encode(b"plain text, not an image")).unwrap_err();
        assert!(matches!(err, HostError::Image(_)), "got {err}");
    }

    #[test]
    fn truncated_png_is_an_image_error() {
        let png = tiny_png();
        let err = decode_image(&STANDARD.encode(&png[..16])).unwrap_err();
        assert!(matches!(err, HostError::Image(_)), "got {err}");
    }
}
