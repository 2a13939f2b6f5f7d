//! Core types & traits: domain-agnostic contracts for tools, resources,
//! prompts and the gateway wire shapes.

pub mod content;
pub mod error;
pub mod mcp;
pub mod prompt;
pub mod resource;
pub mod tool;
pub mod uri;
