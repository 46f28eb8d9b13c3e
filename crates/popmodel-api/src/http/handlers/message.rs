//! The message pipeline handler.
//!
//! POST /api/message - Normalize the inbound text, gather memory context,
//! call the upstream gateway (with model fallback), then best-effort
//! persist the exchange and any extracted memory. Persistence failures
//! after a successful reply are logged and never fail the response.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use popmodel_core::gateway::ChatTurn;
use popmodel_core::memory::{memory_context, update_from_text};
use popmodel_core::spelling::correct_text;
use popmodel_core::store::{MemoryStore, SessionStore};
use popmodel_types::chat::ImageInput;
use popmodel_types::error::UpstreamError;
use popmodel_types::session::{Message, MessageRole, Session};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<ImageInput>>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// POST /api/message - One chat turn.
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<MessageRequest>,
) -> Result<Json<Value>, AppError> {
    let raw_text = request.message.unwrap_or_default();
    let images = request.images.unwrap_or_default();

    // Content validation comes before the credential check so an empty
    // request is a 400 even on an unconfigured server.
    let has_image = images.iter().any(|i| i.to_block().is_some());
    if raw_text.trim().is_empty() && !has_image {
        return Err(UpstreamError::EmptyContent.into());
    }

    let gateway = state.gateway.as_ref().ok_or(AppError::MissingApiKey)?;

    let text = correct_text(state.dictionary.as_ref(), raw_text.trim());
    let memory = state.memory.read(&auth.user_key).await;

    let turn = ChatTurn {
        text: text.clone(),
        images: images.clone(),
        system: request.system,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        admin: auth.admin,
        memory_context: memory_context(&memory),
    };

    let reply = gateway.send(&turn, &state.models).await?;

    let session = persist_exchange(&state, &auth, &request.session_id, &text, &images, &reply.reply)
        .await;
    update_from_text(state.memory.as_ref(), &auth.user_key, &text).await;

    let mut body = json!({
        "reply": reply.reply,
        "admin": auth.admin,
        "sessionId": session.as_ref().map(|s| s.id.clone()),
    });
    if let Some(note) = reply.note {
        body["note"] = Value::String(note);
    }
    Ok(Json(body))
}

/// Load (or create) the session and append both sides of the exchange.
///
/// Runs after a successful upstream reply; any failure here is logged and
/// the reply is still returned, so `None` means "not persisted".
async fn persist_exchange(
    state: &AppState,
    auth: &AuthUser,
    session_id: &Option<String>,
    text: &str,
    images: &[ImageInput],
    reply: &str,
) -> Option<Session> {
    let mut session = match session_id {
        Some(id) => match state.sessions.load(&auth.user_key, id).await {
            Ok(Some(session)) => session,
            Ok(None) | Err(_) => create_session(state, auth).await?,
        },
        None => create_session(state, auth).await?,
    };

    if session.wants_auto_title() && !text.is_empty() {
        session.set_title(text);
    }

    let now = Utc::now();
    let stored_images = if images.is_empty() {
        None
    } else {
        Some(images.iter().map(ImageInput::stored).collect())
    };
    session.push(Message {
        role: MessageRole::User,
        text: text.to_string(),
        ts: now,
        images: stored_images,
        admin: None,
    });
    session.push(Message {
        role: MessageRole::Assistant,
        text: reply.to_string(),
        ts: now,
        images: None,
        admin: auth.admin.then_some(true),
    });

    if let Err(err) = state.sessions.save(&auth.user_key, &session).await {
        warn!(session_id = %session.id, error = %err, "could not persist exchange");
        return None;
    }
    Some(session)
}

async fn create_session(state: &AppState, auth: &AuthUser) -> Option<Session> {
    match state.sessions.create(&auth.user_key, None).await {
        Ok(session) => Some(session),
        Err(err) => {
            warn!(user_key = %auth.user_key, error = %err, "could not create session");
            None
        }
    }
}
