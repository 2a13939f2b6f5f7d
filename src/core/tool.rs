use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::core::content::ContentItem;
use crate::core::error::HostError;

/// Minimal metadata every tool must expose.
pub trait ToolSpec {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> JsonValue;
}

/// Tool = metadata + invocation.
#[async_trait]
pub trait Tool: ToolSpec + Send + Sync {
    async fn call(&self, arguments: &JsonValue) -> Result<Vec<ContentItem>, HostError>;
}

/// Deserialize tool arguments into a typed struct. A `null` argument object
/// is treated as `{}` so tools with all-optional parameters can be called
/// bare.
pub fn parse_args<T: DeserializeOwned>(arguments: &JsonValue) -> Result<T, HostError> {
    let args = match arguments {
        JsonValue::Null => JsonValue::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(args).map_err(HostError::invalid_arguments)
}
