//! Health, client configuration, and model selection handlers.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use popmodel_core::model::{catalog, resolve};

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /api/health - Liveness check (no auth required).
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/config - Client bootstrap configuration.
pub async fn get_config(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "model": state.models.current().await,
        "defaultModel": state.default_model,
        "clientId": state.client_id,
        "authRequired": state.auth_required(),
    }))
}

/// GET /api/models - The allow-listed model catalog.
///
/// Also self-heals: a persisted selection that fell off the allow-list is
/// reset to the first catalog entry before the catalog is returned.
pub async fn list_models(State(state): State<AppState>) -> Json<Value> {
    let current = state.models.ensure_allowed().await;
    Json(json!({
        "models": catalog(),
        "current": current,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SetModelRequest {
    #[serde(default)]
    pub model: String,
}

/// POST /api/config/model - Switch the current model by id or label.
pub async fn set_model(
    State(state): State<AppState>,
    Json(request): Json<SetModelRequest>,
) -> Result<Json<Value>, AppError> {
    let model = resolve(&request.model)
        .ok_or_else(|| AppError::Validation(format!("unknown model: '{}'", request.model)))?;
    state.models.switch(&model).await?;
    tracing::info!(model = %model, "model switched");
    Ok(Json(json!({"ok": true, "model": model})))
}
