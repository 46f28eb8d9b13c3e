//! Shared domain types for the PopModel chat backend.
//!
//! This crate holds the data model (sessions, messages, user memory, model
//! configuration) and the error taxonomy. It has no I/O and no business
//! logic beyond small invariant-preserving helpers, so every other crate
//! can depend on it without pulling in infrastructure.

pub mod chat;
pub mod error;
pub mod memory;
pub mod model;
pub mod session;
