//! Gateway wire shapes for the flattened tool-call endpoint.
//!
//! Requests look like JSON-RPC (`jsonrpc`, `id`, `method` are accepted and
//! ignored); only `params` matters. Responses are flat envelopes, not
//! JSON-RPC responses.

use serde::{Deserialize, Serialize};
use serde_json::Value as J;

pub const NO_RESULT_TEXT: &str = "Operation completed but no result returned";

#[derive(Deserialize, Debug, Default)]
pub struct CallToolRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<J>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: CallToolParams,
}

#[derive(Deserialize, Debug, Default)]
pub struct CallToolParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<J>,
}

impl CallToolParams {
    /// Tool name, treating an empty string as absent.
    pub fn tool_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn arguments_or_empty(&self) -> J {
        match &self.arguments {
            Some(J::Null) | None => J::Object(Default::default()),
            Some(v) => v.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TextItem {
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CallResult {
    pub content: Vec<TextItem>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CallEnvelope {
    pub result: CallResult,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub error: String,
}

pub fn ok(text: impl Into<String>) -> CallEnvelope {
    CallEnvelope {
        result: CallResult { content: vec![TextItem { text: text.into() }] },
    }
}

pub fn err(message: impl Into<String>) -> ErrorEnvelope {
    ErrorEnvelope { error: message.into() }
}
