//! URI templates for resources, e.g. `users://{user_id}/profile`.
//!
//! Placeholders match one non-empty segment: a value never contains `/`.

use std::collections::HashMap;

use crate::core::error::HostError;

pub type UriParams = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Var(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    raw: String,
    tokens: Vec<Token>,
}

impl UriTemplate {
    pub fn parse(raw: &str) -> Result<Self, HostError> {
        let mut tokens = Vec::new();
        let mut rest = raw;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                tokens.push(Token::Literal(rest[..open].to_string()));
            }
            let close = rest[open..]
                .find('}')
                .map(|i| open + i)
                .ok_or_else(|| HostError::InvalidArguments(format!("unclosed placeholder in {raw}")))?;
            let name = &rest[open + 1..close];
            if name.is_empty() {
                return Err(HostError::InvalidArguments(format!("empty placeholder in {raw}")));
            }
            if matches!(tokens.last(), Some(Token::Var(_))) {
                return Err(HostError::InvalidArguments(format!(
                    "adjacent placeholders in {raw}"
                )));
            }
            tokens.push(Token::Var(name.to_string()));
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            tokens.push(Token::Literal(rest.to_string()));
        }
        Ok(Self { raw: raw.to_string(), tokens })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_templated(&self) -> bool {
        self.tokens.iter().any(|t| matches!(t, Token::Var(_)))
    }

    /// Match a concrete URI, returning the placeholder values.
    pub fn matches(&self, uri: &str) -> Option<UriParams> {
        let mut params = UriParams::new();
        let mut rest = uri;
        let mut iter = self.tokens.iter().peekable();
        while let Some(token) = iter.next() {
            match token {
                Token::Literal(lit) => rest = rest.strip_prefix(lit.as_str())?,
                Token::Var(name) => {
                    let end = match iter.peek() {
                        Some(Token::Literal(next)) => rest.find(next.as_str())?,
                        _ => rest.len(),
                    };
                    let value = &rest[..end];
                    if value.is_empty() || value.contains('/') {
                        return None;
                    }
                    params.insert(name.clone(), value.to_string());
                    rest = &rest[end..];
                }
            }
        }
        rest.is_empty().then_some(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_uri_matches_only_itself() {
        let t = UriTemplate::parse("config://app").unwrap();
        assert!(!t.is_templated());
        assert_eq!(t.matches("config://app"), Some(UriParams::new()));
        assert!(t.matches("config://app2").is_none());
        assert!(t.matches("config://ap").is_none());
    }

    #[test]
    fn placeholder_captures_one_segment() {
        let t = UriTemplate::parse("users://{user_id}/profile").unwrap();
        assert!(t.is_templated());
        let p = t.matches("users://42/profile").unwrap();
        assert_eq!(p["user_id"], "42");
        assert!(t.matches("users:///profile").is_none());
        assert!(t.matches("users://a/b/profile").is_none());
        assert!(t.matches("users://42/settings").is_none());
    }

    #[test]
    fn trailing_placeholder_takes_remainder() {
        let t = UriTemplate::parse("docs://{slug}").unwrap();
        assert_eq!(t.matches("docs://intro").unwrap()["slug"], "intro");
    }

    #[test]
    fn rejects_malformed_templates() {
        assert!(UriTemplate::parse("users://{id").is_err());
        assert!(UriTemplate::parse("users://{}/x").is_err());
        assert!(UriTemplate::parse("x://{a}{b}").is_err());
    }
}
