//! Identity verification trait and the in-memory admin token set.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;

use popmodel_types::error::AuthError;

/// The fixed namespace used when identity verification is disabled.
pub const ANON_USER_KEY: &str = "anon";

/// Verifies bearer identity tokens against the configured provider.
///
/// The concrete implementation (`popmodel-infra`) calls the Google
/// tokeninfo endpoint; tests mock this trait.
pub trait IdentityVerifier: Send + Sync {
    /// Verify a bearer token and return the stable subject identifier.
    fn verify(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<String, AuthError>> + Send;
}

/// Derive the storage namespace for a verified subject.
pub fn user_key_for_subject(sub: &str) -> String {
    format!("user_{sub}")
}

/// Ephemeral admin bearer tokens.
///
/// Issued on successful admin login, held only in memory, and invalidated
/// by process restart or expiry. Tokens expire twelve hours after issue;
/// expired entries are pruned on verification.
pub struct AdminTokens {
    tokens: DashMap<String, Instant>,
    ttl: Duration,
}

/// Admin token lifetime.
const ADMIN_TOKEN_TTL: Duration = Duration::from_secs(12 * 60 * 60);

impl AdminTokens {
    pub fn new() -> Self {
        Self::with_ttl(ADMIN_TOKEN_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            tokens: DashMap::new(),
            ttl,
        }
    }

    /// Mint a fresh opaque token and record its issue time.
    pub fn issue(&self) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        self.tokens.insert(token.clone(), Instant::now());
        token
    }

    /// Whether the token is known and still within its lifetime.
    pub fn verify(&self, token: &str) -> bool {
        let ttl = self.ttl;
        self.tokens.retain(|_, issued| issued.elapsed() < ttl);
        self.tokens.contains_key(token)
    }
}

impl Default for AdminTokens {
    fn default() -> Self {
        Self::new()
    }
}
