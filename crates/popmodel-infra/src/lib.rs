//! Infrastructure implementations for PopModel.
//!
//! Concrete adapters behind the `popmodel-core` traits: file-backed JSON
//! stores, the Anthropic Messages API client, Google token verification,
//! the word-list spelling dictionary, and the TTS proxy client.

pub mod auth;
pub mod fs;
pub mod llm;
pub mod spelling;
pub mod tts;
