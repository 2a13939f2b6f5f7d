use serde_json::Value as JsonValue;

use crate::core::error::HostError;
use crate::core::prompt::{Prompt, PromptArg};

#[derive(Clone, Default)]
pub struct AnalyzeDataPrompt;

pub fn analyze_data(data: &str) -> String {
    format!(
        "Please analyze the following data and provide insights:\n\n{data}\n\nFocus on key patterns, anomalies, and actionable insights.\n"
    )
}

impl Prompt for AnalyzeDataPrompt {
    fn name(&self) -> &'static str {
        "analyze_data"
    }
    fn description(&self) -> &'static str {
        "Create a prompt to analyze data."
    }
    fn arguments(&self) -> Vec<PromptArg> {
        vec![PromptArg { name: "data", description: "The data to analyze", required: true }]
    }
    fn render(&self, arguments: &JsonValue) -> Result<String, HostError> {
        let data = arguments
            .get("data")
            .and_then(|v| v.as_str())
            .ok_or_else(|| HostError::InvalidArguments("missing required argument: data".into()))?;
        Ok(analyze_data(data))
    }
}
