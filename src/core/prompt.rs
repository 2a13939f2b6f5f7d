use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::error::HostError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptArg {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// A named function producing an instruction string from input data.
pub trait Prompt: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn arguments(&self) -> Vec<PromptArg>;
    fn render(&self, arguments: &JsonValue) -> Result<String, HostError>;
}
