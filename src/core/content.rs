//! Tool result content model.

use serde_json::Value as JsonValue;

/// One item of a tool result.
///
/// Tools in this crate only produce text, but the native protocol allows
/// other kinds (images, embedded resources). Those are carried as raw JSON
/// and rendered as their JSON string form when a flat text is required.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text(String),
    Other(JsonValue),
}

impl ContentItem {
    pub fn text(s: impl Into<String>) -> Self {
        ContentItem::Text(s.into())
    }

    pub fn to_text(&self) -> String {
        match self {
            ContentItem::Text(s) => s.clone(),
            ContentItem::Other(v) => v.to_string(),
        }
    }
}

impl From<String> for ContentItem {
    fn from(s: String) -> Self {
        ContentItem::Text(s)
    }
}
