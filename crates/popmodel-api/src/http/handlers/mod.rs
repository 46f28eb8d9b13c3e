pub mod admin;
pub mod config;
pub mod history;
pub mod memory;
pub mod message;
pub mod tts;
