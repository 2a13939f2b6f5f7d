use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::clients::{ModelClient, ModelError};
use crate::domain::{ChatMessage, ChatRole, GenerationConfig, ImageInput};
use crate::infra::config::{GeminiConfig, DEFAULT_TIMEOUT_SECS};
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::{make_http_client, make_http_client_with};

/// Gemini `generateContent` REST client.
#[derive(Clone)]
pub struct GeminiClient {
    base: String,
    model: String,
    api_key: Option<String>,
    http: Client,
}

impl GeminiClient {
    pub fn new(
        base: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, ModelError> {
        let http = make_http_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?;
        Ok(Self { base: base.into(), model: model.into(), api_key, http })
    }

    pub fn from_config(cfg: &GeminiConfig) -> Result<Self, ModelError> {
        let http = make_http_client_with(cfg)?;
        Ok(Self {
            base: cfg.base_url.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate_content(
        &self,
        operation: &'static str,
        body: GenerateContentRequest,
    ) -> Result<String, ModelError> {
        let start = Instant::now();
        let res = self.send(&body).await;
        match &res {
            Ok(_) => {
                let elapsed_ms = start.elapsed().as_millis() as f64;
                crate::infra::logging::log_metric(operation, "model_latency_ms", elapsed_ms);
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "gemini request failed");
                crate::infra::logging::log_metric(operation, "model_error_total", 1.0);
            }
        }
        res
    }

    async fn send(&self, body: &GenerateContentRequest) -> Result<String, ModelError> {
        let key = self.api_key.as_deref().ok_or(ModelError::MissingApiKey)?;
        let url = self.endpoint();
        let (builder, rid) = add_standard_headers(self.http.post(&url), None);
        tracing::debug!(endpoint = %url, request_id = %rid, "gemini.generateContent request");

        let resp = builder
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorWire>(&raw)
                .map(|w| w.error.message)
                .unwrap_or(raw);
            return Err(ModelError::Api { status: status.as_u16(), message });
        }

        let parsed: GenerateContentResponse = resp.json().await?;
        parsed.into_text()
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate_text(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, ModelError> {
        let body = GenerateContentRequest {
            contents: vec![ContentWire::user(vec![PartWire::Text(prompt.to_owned())])],
            system_instruction: None,
            generation_config: GenerationConfigWire::from_config(config),
        };
        self.generate_content("generate_text", body).await
    }

    async fn analyze_image(&self, prompt: &str, image: &ImageInput) -> Result<String, ModelError> {
        let body = GenerateContentRequest {
            contents: vec![ContentWire::user(vec![
                PartWire::Text(prompt.to_owned()),
                PartWire::InlineData(BlobWire {
                    mime_type: image.mime_type.to_owned(),
                    data: STANDARD.encode(&image.bytes),
                }),
            ])],
            system_instruction: None,
            generation_config: None,
        };
        self.generate_content("analyze_image", body).await
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<String, ModelError> {
        let mut system = Vec::new();
        let mut contents = Vec::new();
        for m in messages {
            let part = PartWire::Text(m.content.clone());
            match m.role {
                ChatRole::System => system.push(part),
                ChatRole::User => contents.push(ContentWire::user(vec![part])),
                ChatRole::Assistant => contents.push(ContentWire {
                    role: Some("model".into()),
                    parts: vec![part],
                }),
            }
        }
        let body = GenerateContentRequest {
            contents,
            system_instruction: (!system.is_empty()).then(|| ContentWire { role: None, parts: system }),
            generation_config: GenerationConfigWire::from_config(config),
        };
        self.generate_content("chat_with_gemini", body).await
    }
}

// --- wire types ---

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<ContentWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ContentWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfigWire>,
}

#[derive(Serialize, Debug)]
struct ContentWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<PartWire>,
}

impl ContentWire {
    fn user(parts: Vec<PartWire>) -> Self {
        Self { role: Some("user".into()), parts }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
enum PartWire {
    Text(String),
    InlineData(BlobWire),
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct BlobWire {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl GenerationConfigWire {
    fn from_config(cfg: &GenerationConfig) -> Option<Self> {
        if cfg.temperature.is_none() && cfg.max_output_tokens.is_none() {
            return None;
        }
        Some(Self { temperature: cfg.temperature, max_output_tokens: cfg.max_output_tokens })
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<CandidateWire>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedbackWire>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CandidateWire {
    #[serde(default)]
    content: Option<CandidateContentWire>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContentWire {
    #[serde(default)]
    parts: Vec<CandidatePartWire>,
}

#[derive(Deserialize, Debug)]
struct CandidatePartWire {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedbackWire {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorWire {
    error: ApiErrorBody,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, ModelError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ModelError::NoCandidates {
                block_reason: self.prompt_feedback.and_then(|f| f.block_reason),
            });
        };
        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if texts.is_empty() {
            return Err(ModelError::NoText(
                candidate.finish_reason.unwrap_or_else(|| "unknown".into()),
            ));
        }
        Ok(texts.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::DEFAULT_MODEL;
    use httpmock::prelude::*;
    use serde_json::json;

    const PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(server.base_url(), DEFAULT_MODEL, Some("test-key".into())).unwrap()
    }

    fn reply(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn generate_text_posts_prompt_and_config() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path(PATH)
                .header("x-goog-api-key", "test-key")
                .header_exists("x-request-id")
                .json_body(json!({
                    "contents": [{"role": "user", "parts": [{"text": "Write a haiku"}]}],
                    "generationConfig": {"temperature": 0.5, "maxOutputTokens": 64}
                }));
            then.status(200).json_body(reply("An old silent pond"));
        });

        let cfg = GenerationConfig { temperature: Some(0.5), max_output_tokens: Some(64) };
        let out = client(&server).generate_text("Write a haiku", &cfg).await.unwrap();
        m.assert();
        assert_eq!(out, "An old silent pond");
    }

    #[tokio::test]
    async fn analyze_image_sends_inline_data() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path(PATH).json_body(json!({
                "contents": [{"role": "user", "parts": [
                    {"text": "What is this?"},
                    {"inlineData": {"mimeType": "image/png", "data": "AQID"}}
                ]}]
            }));
            then.status(200).json_body(reply("A tiny image"));
        });

        let image = ImageInput { bytes: vec![1, 2, 3], mime_type: "image/png" };
        let out = client(&server).analyze_image("What is this?", &image).await.unwrap();
        m.assert();
        assert_eq!(out, "A tiny image");
    }

    #[tokio::test]
    async fn chat_replays_turns_in_order() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path(PATH).json_body(json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "hi"}]},
                    {"role": "model", "parts": [{"text": "hello!"}]},
                    {"role": "user", "parts": [{"text": "how are you?"}]}
                ],
                "systemInstruction": {"parts": [{"text": "be brief"}]},
                "generationConfig": {"temperature": 0.25}
            }));
            then.status(200).json_body(reply("fine"));
        });

        let messages = vec![
            ChatMessage { role: ChatRole::System, content: "be brief".into() },
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello!"),
            ChatMessage::user("how are you?"),
        ];
        let cfg = GenerationConfig { temperature: Some(0.25), max_output_tokens: None };
        let out = client(&server).chat(&messages, &cfg).await.unwrap();
        m.assert();
        assert_eq!(out, "fine");
    }

    #[tokio::test]
    async fn concatenates_text_parts() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).json_body(json!({
                "candidates": [{"content": {"parts": [{"text": "a"}, {"text": "b"}]}}]
            }));
        });
        let out = client(&server)
            .generate_text("x", &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(out, "ab");
    }

    #[tokio::test]
    async fn maps_api_error_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(PATH);
            then.status(400).json_body(json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            }));
        });
        let err = client(&server)
            .generate_text("x", &GenerationConfig::default())
            .await
            .unwrap_err();
        match err {
            ModelError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_is_kept_verbatim() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(PATH);
            then.status(503).body("upstream down");
        });
        let err = client(&server)
            .generate_text("x", &GenerationConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "model API returned 503: upstream down");
    }

    #[tokio::test]
    async fn blocked_prompt_reports_reason() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(PATH);
            then.status(200)
                .json_body(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        });
        let err = client(&server)
            .generate_text("x", &GenerationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::NoCandidates { block_reason: Some(ref r) } if r == "SAFETY"
        ));
    }

    #[tokio::test]
    async fn candidate_without_text_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(PATH);
            then.status(200)
                .json_body(json!({"candidates": [{"finishReason": "MAX_TOKENS"}]}));
        });
        let err = client(&server)
            .generate_text("x", &GenerationConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_network() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).json_body(reply("never"));
        });
        let cli = GeminiClient::new(server.base_url(), DEFAULT_MODEL, None).unwrap();
        let err = cli.generate_text("x", &GenerationConfig::default()).await.unwrap_err();
        assert!(matches!(err, ModelError::MissingApiKey));
        m.assert_hits(0);
    }

    #[test]
    fn from_config_uses_configured_model() {
        let cfg = GeminiConfig {
            api_key: Some("k".into()),
            model: "gemini-1.5-pro".into(),
            base_url: "http://localhost:1/".into(),
            timeout_secs: 3,
        };
        let cli = GeminiClient::from_config(&cfg).unwrap();
        assert_eq!(cli.model(), "gemini-1.5-pro");
        assert_eq!(
            cli.endpoint(),
            "http://localhost:1/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }
}
