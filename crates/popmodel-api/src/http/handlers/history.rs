//! Session history CRUD handlers.
//!
//! Endpoints:
//! - GET    /api/history            - List session summaries
//! - POST   /api/history/new        - Create an empty session
//! - GET    /api/history/{id}       - Fetch a full session
//! - POST   /api/history/{id}/rename - Rename a session
//! - DELETE /api/history/{id}       - Delete a session
//! - POST   /api/history/clear      - Delete every session in the namespace

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use popmodel_core::store::SessionStore;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

/// GET /api/history - Session summaries, most recently updated first.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let sessions = state.sessions.list(&auth.user_key).await?;
    Ok(Json(json!({"sessions": sessions})))
}

#[derive(Debug, Deserialize)]
pub struct NewSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// POST /api/history/new - Create an empty session.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<NewSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let session = state
        .sessions
        .create(&auth.user_key, request.title.as_deref())
        .await?;
    tracing::info!(session_id = %session.id, user_key = %auth.user_key, "session created");
    Ok(Json(json!({"id": session.id, "title": session.title})))
}

/// GET /api/history/{id} - Full session including messages.
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session = state
        .sessions
        .load(&auth.user_key, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("session '{id}' not found")))?;
    Ok(Json(json!({
        "id": session.id,
        "title": session.title,
        "messages": session.messages,
    })))
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    #[serde(default)]
    pub title: String,
}

/// POST /api/history/{id}/rename - Replace a session's title.
pub async fn rename(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<RenameRequest>,
) -> Result<Json<Value>, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    let mut session = state
        .sessions
        .load(&auth.user_key, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("session '{id}' not found")))?;
    session.set_title(&request.title);
    state.sessions.save(&auth.user_key, &session).await?;
    Ok(Json(json!({"ok": true, "id": session.id, "title": session.title})))
}

/// DELETE /api/history/{id} - Delete a session. Idempotent.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.sessions.delete(&auth.user_key, &id).await?;
    tracing::info!(session_id = %id, user_key = %auth.user_key, "session deleted");
    Ok(Json(json!({"ok": true, "id": id})))
}

/// POST /api/history/clear - Delete every session in the namespace.
pub async fn clear(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let cleared = state.sessions.clear(&auth.user_key).await?;
    tracing::info!(user_key = %auth.user_key, cleared, "history cleared");
    Ok(Json(json!({"ok": true, "cleared": cleared})))
}
