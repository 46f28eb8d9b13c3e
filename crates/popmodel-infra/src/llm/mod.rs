//! Upstream LLM provider clients.

pub mod anthropic;
