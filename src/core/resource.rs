use async_trait::async_trait;

use crate::core::error::HostError;
use crate::core::uri::{UriParams, UriTemplate};

/// A named, read-only data endpoint addressed by a URI or URI template.
#[async_trait]
pub trait Resource: Send + Sync {
    /// URI, or URI template with `{placeholder}` segments.
    fn uri(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn mime_type(&self) -> &'static str {
        "application/json"
    }
    async fn read(&self, uri: &str, params: &UriParams) -> Result<String, HostError>;
}

/// A registered resource together with its parsed template.
#[derive(Clone)]
pub struct ResourceEntry {
    pub template: UriTemplate,
    pub resource: std::sync::Arc<dyn Resource>,
}

impl ResourceEntry {
    pub fn new(resource: std::sync::Arc<dyn Resource>) -> Result<Self, HostError> {
        let template = UriTemplate::parse(resource.uri())?;
        Ok(Self { template, resource })
    }
}
