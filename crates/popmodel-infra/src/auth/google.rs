//! Google ID token verification via the tokeninfo endpoint.
//!
//! The token is posted to Google; the response's `aud` claim must match
//! the configured OAuth client id before the `sub` claim is trusted.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use popmodel_core::auth::IdentityVerifier;
use popmodel_types::error::AuthError;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Verifies Google ID tokens for a single OAuth client id.
pub struct GoogleTokenVerifier {
    client: reqwest::Client,
    client_id: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
}

impl GoogleTokenVerifier {
    pub fn new(client_id: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            client_id,
            base_url: TOKENINFO_URL.to_string(),
        }
    }

    /// Override the tokeninfo URL (useful for testing).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

impl IdentityVerifier for GoogleTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "tokeninfo request failed");
                AuthError::InvalidToken
            })?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidToken);
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            warn!(error = %e, "tokeninfo response unreadable");
            AuthError::InvalidToken
        })?;

        if info.aud != self.client_id {
            warn!("tokeninfo audience mismatch");
            return Err(AuthError::InvalidToken);
        }
        Ok(info.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokeninfo_parses_claims() {
        let body = r#"{"aud":"client-123","sub":"108234567890","email":"a@b.c"}"#;
        let info: TokenInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.aud, "client-123");
        assert_eq!(info.sub, "108234567890");
    }
}
