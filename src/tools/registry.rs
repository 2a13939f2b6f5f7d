use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::content::ContentItem;
use crate::core::error::HostError;
use crate::core::prompt::{Prompt, PromptArg};
use crate::core::resource::{Resource, ResourceEntry};
use crate::core::tool::Tool;

/// In-process registry and dispatcher for tools, resources and prompts.
///
/// Built once at startup and immutable afterwards; clones share the same
/// registrations.
#[derive(Clone)]
pub struct ToolHost {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    tools: Vec<Arc<dyn Tool>>,
    resources: Vec<ResourceEntry>,
    prompts: Vec<Arc<dyn Prompt>>,
}

pub struct ToolHostBuilder {
    name: String,
    tools: Vec<Arc<dyn Tool>>,
    resources: Vec<ResourceEntry>,
    prompts: Vec<Arc<dyn Prompt>>,
}

impl ToolHostBuilder {
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, HostError> {
        if self.tools.iter().any(|t| t.name() == tool.name()) {
            return Err(HostError::Duplicate(format!("tool {}", tool.name())));
        }
        self.tools.push(tool);
        Ok(self)
    }

    pub fn resource(mut self, resource: Arc<dyn Resource>) -> Result<Self, HostError> {
        if self
            .resources
            .iter()
            .any(|r| r.resource.name() == resource.name() || r.resource.uri() == resource.uri())
        {
            return Err(HostError::Duplicate(format!("resource {}", resource.name())));
        }
        self.resources.push(ResourceEntry::new(resource)?);
        Ok(self)
    }

    pub fn prompt(mut self, prompt: Arc<dyn Prompt>) -> Result<Self, HostError> {
        if self.prompts.iter().any(|p| p.name() == prompt.name()) {
            return Err(HostError::Duplicate(format!("prompt {}", prompt.name())));
        }
        self.prompts.push(prompt);
        Ok(self)
    }

    pub fn build(self) -> ToolHost {
        ToolHost {
            inner: Arc::new(Inner {
                name: self.name,
                tools: self.tools,
                resources: self.resources,
                prompts: self.prompts,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolMeta {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_template: Option<&'static str>,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBody {
    pub uri: String,
    pub mime_type: &'static str,
    pub text: String,
}

impl ToolHost {
    pub fn builder(name: impl Into<String>) -> ToolHostBuilder {
        ToolHostBuilder {
            name: name.into(),
            tools: Vec::new(),
            resources: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn list_tools(&self) -> Vec<ToolMeta> {
        self.inner
            .tools
            .iter()
            .map(|t| ToolMeta {
                name: t.name(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    pub fn list_resources(&self) -> Vec<ResourceMeta> {
        self.inner
            .resources
            .iter()
            .map(|e| {
                let r = &e.resource;
                let templated = e.template.is_templated();
                ResourceMeta {
                    uri: (!templated).then(|| r.uri()),
                    uri_template: templated.then(|| r.uri()),
                    name: r.name(),
                    description: r.description(),
                    mime_type: r.mime_type(),
                }
            })
            .collect()
    }

    pub fn list_prompts(&self) -> Vec<PromptMeta> {
        self.inner
            .prompts
            .iter()
            .map(|p| PromptMeta {
                name: p.name(),
                description: p.description(),
                arguments: p.arguments(),
            })
            .collect()
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: &JsonValue,
    ) -> Result<Vec<ContentItem>, HostError> {
        let tool = self
            .inner
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| HostError::UnknownTool(name.to_string()))?;
        let start = Instant::now();
        let res = tool.call(arguments).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &res {
            Ok(items) => tracing::info!(tool = name, elapsed_ms, items = items.len(), "tool call completed"),
            Err(e) => tracing::debug!(tool = name, elapsed_ms, error = %e, "tool call failed"),
        }
        res
    }

    /// Read a resource by concrete URI. Exact URIs win over templates.
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceBody, HostError> {
        let (statics, templated): (Vec<_>, Vec<_>) = self
            .inner
            .resources
            .iter()
            .partition(|e| !e.template.is_templated());
        for entry in statics.into_iter().chain(templated) {
            if let Some(params) = entry.template.matches(uri) {
                let text = entry.resource.read(uri, &params).await?;
                return Ok(ResourceBody {
                    uri: uri.to_string(),
                    mime_type: entry.resource.mime_type(),
                    text,
                });
            }
        }
        Err(HostError::UnknownResource(uri.to_string()))
    }

    pub fn get_prompt(&self, name: &str, arguments: &JsonValue) -> Result<String, HostError> {
        let prompt = self
            .inner
            .prompts
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| HostError::UnknownPrompt(name.to_string()))?;
        prompt.render(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tool::ToolSpec;
    use crate::core::uri::UriParams;
    use async_trait::async_trait;

    struct Echo(&'static str);

    impl ToolSpec for Echo {
        fn name(&self) -> &'static str {
            self.0
        }
        fn description(&self) -> &'static str {
            "echo tool"
        }
        fn input_schema(&self) -> JsonValue {
            serde_json::json!({"type":"object"})
        }
    }

    #[async_trait]
    impl Tool for Echo {
        async fn call(&self, args: &JsonValue) -> Result<Vec<ContentItem>, HostError> {
            Ok(vec![ContentItem::text(args.to_string())])
        }
    }

    struct Fixed(&'static str, &'static str);

    #[async_trait]
    impl Resource for Fixed {
        fn uri(&self) -> &'static str {
            self.0
        }
        fn name(&self) -> &'static str {
            self.1
        }
        fn description(&self) -> &'static str {
            "fixed"
        }
        async fn read(&self, _uri: &str, params: &UriParams) -> Result<String, HostError> {
            Ok(format!("{}:{}", self.1, params.get("id").cloned().unwrap_or_default()))
        }
    }

    fn host() -> ToolHost {
        ToolHost::builder("test")
            .tool(Arc::new(Echo("b.echo")))
            .unwrap()
            .tool(Arc::new(Echo("a.echo")))
            .unwrap()
            .resource(Arc::new(Fixed("items://{id}", "by_id")))
            .unwrap()
            .resource(Arc::new(Fixed("items://all", "all")))
            .unwrap()
            .build()
    }

    #[tokio::test]
    async fn registers_lists_in_order_and_calls() {
        let host = host();
        let names: Vec<_> = host.list_tools().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["b.echo", "a.echo"]);
        let out = host.call_tool("a.echo", &serde_json::json!({"x": 2})).await.unwrap();
        assert_eq!(out[0].to_text(), r#"{"x":2}"#);
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let err = host().call_tool("nope", &JsonValue::Null).await.unwrap_err();
        assert!(matches!(err, HostError::UnknownTool(ref n) if n == "nope"));
    }

    #[test]
    fn duplicate_tool_is_rejected() {
        let res = ToolHost::builder("dup")
            .tool(Arc::new(Echo("x")))
            .unwrap()
            .tool(Arc::new(Echo("x")));
        assert!(matches!(res, Err(HostError::Duplicate(_))));
    }

    #[tokio::test]
    async fn exact_resource_wins_over_template() {
        let host = host();
        assert_eq!(host.read_resource("items://all").await.unwrap().text, "all:");
        assert_eq!(host.read_resource("items://7").await.unwrap().text, "by_id:7");
        assert!(matches!(
            host.read_resource("other://x").await,
            Err(HostError::UnknownResource(_))
        ));
    }

    #[test]
    fn resource_listing_separates_uri_and_template() {
        let metas = host().list_resources();
        assert_eq!(metas[0].uri_template, Some("items://{id}"));
        assert!(metas[0].uri.is_none());
        assert_eq!(metas[1].uri, Some("items://all"));
        let v = serde_json::to_value(&metas[0]).unwrap();
        assert_eq!(v["uriTemplate"], "items://{id}");
        assert_eq!(v["mimeType"], "application/json");
    }
}
