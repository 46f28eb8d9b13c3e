//! Persistent-memory handlers.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use popmodel_core::store::MemoryStore;
use popmodel_types::memory::UserMemory;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

/// POST /api/memory/clear - Reset the namespace's memory record.
pub async fn clear(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    state
        .memory
        .write(&auth.user_key, &UserMemory::default())
        .await?;
    tracing::info!(user_key = %auth.user_key, "memory cleared");
    Ok(Json(json!({"ok": true})))
}
