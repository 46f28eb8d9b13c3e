//! Text-to-speech proxy handler.
//!
//! POST /api/tts - Stream MP3 audio for the given text through the
//! server so the browser never contacts the TTS upstream directly.

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use serde::Deserialize;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub lang: Option<String>,
}

/// POST /api/tts - `{text, lang?}` -> `audio/mpeg` stream.
pub async fn speak(
    State(state): State<AppState>,
    Json(request): Json<TtsRequest>,
) -> Result<Response, AppError> {
    let lang = request.lang.as_deref().unwrap_or("en");
    let upstream = state.tts.fetch(&request.text, lang).await?;

    let stream = upstream.bytes_stream().map_err(std::io::Error::other);
    let body = Body::from_stream(stream);
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], body).into_response())
}
