//! Admin login handler.
//!
//! POST /api/admin/login - Exchange the shared admin code for an
//! ephemeral bearer token.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use popmodel_types::error::AuthError;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub code: String,
}

/// POST /api/admin/login - `{code}` -> `{token}` | 403.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    if request.code != *state.admin_code {
        tracing::warn!("admin login rejected");
        return Err(AuthError::InvalidAdminCode.into());
    }
    let token = state.admin_tokens.issue();
    tracing::info!("admin token issued");
    Ok(Json(json!({"token": token})))
}
