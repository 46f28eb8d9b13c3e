//! Request identity extractor.
//!
//! Resolves the storage namespace and admin flag for a request:
//! - `Authorization: Bearer <id-token>` is verified against Google when
//!   identity verification is enabled; the namespace is derived from the
//!   stable subject. When verification is disabled every request maps to
//!   the anonymous namespace.
//! - `X-Admin-Token: <token>` marks the request as admin mode when the
//!   token was issued by `/api/admin/login` and has not expired. An
//!   invalid admin token is ignored rather than rejected.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use popmodel_core::auth::{ANON_USER_KEY, IdentityVerifier, user_key_for_subject};
use popmodel_types::error::AuthError;

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated request identity.
pub struct AuthUser {
    /// Storage namespace: `user_<sub>` or `anon`.
    pub user_key: String,
    /// Whether a valid admin token accompanied the request.
    pub admin: bool,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin = parts
            .headers
            .get("x-admin-token")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|token| state.admin_tokens.verify(token));

        let user_key = match &state.verifier {
            None => ANON_USER_KEY.to_string(),
            Some(verifier) => {
                let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
                let sub = verifier.verify(&token).await?;
                user_key_for_subject(&sub)
            }
        };

        Ok(AuthUser { user_key, admin })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let auth = parts.headers.get("authorization")?.to_str().ok()?;
    let token = auth.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
