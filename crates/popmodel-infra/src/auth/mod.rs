//! Identity provider adapters.

pub mod google;

pub use google::GoogleTokenVerifier;
