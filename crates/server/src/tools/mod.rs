//! MCP tool implementations.
//!
//! This module contains all tools exposed by the wikicard-mcp server.

pub mod wiki_user;

pub use wiki_user::{ModeParam, WikiUserOutput, WikiUserParams};
