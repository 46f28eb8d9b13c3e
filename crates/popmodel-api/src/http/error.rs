//! Application error type mapping to HTTP status codes and envelope format.
//!
//! Every error response is `{error, message?, details?}`. Upstream 4xx
//! detail is forwarded to the client; upstream 5xx detail is logged
//! server-side and never forwarded.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use popmodel_types::error::{AuthError, StoreError, TtsError, UpstreamError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Request failed validation.
    Validation(String),
    /// Identity or admin authentication failure.
    Auth(AuthError),
    /// Referenced record does not exist.
    NotFound(String),
    /// Client exceeded the request rate window.
    RateLimited,
    /// The upstream API key is not configured.
    MissingApiKey,
    /// Upstream model API failure.
    Upstream(UpstreamError),
    /// Persistence failure on an explicit store operation.
    Store(StoreError),
    /// TTS proxy failure.
    Tts(TtsError),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<UpstreamError> for AppError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::MissingCredential => AppError::MissingApiKey,
            UpstreamError::EmptyContent => {
                AppError::Validation("message text or images required".to_string())
            }
            other => AppError::Upstream(other),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AppError::NotFound("session not found".to_string()),
            StoreError::InvalidId(id) => AppError::Validation(format!("invalid id: '{id}'")),
            other => AppError::Store(other),
        }
    }
}

impl From<TtsError> for AppError {
    fn from(e: TtsError) -> Self {
        match e {
            TtsError::InvalidText(msg) => AppError::Validation(msg),
            other => AppError::Tts(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "ValidationError", "message": message}),
            ),
            AppError::Auth(AuthError::InvalidAdminCode) => (
                StatusCode::FORBIDDEN,
                json!({"error": "Forbidden", "message": "invalid code"}),
            ),
            AppError::Auth(e) => (
                StatusCode::UNAUTHORIZED,
                json!({"error": "Unauthorized", "message": e.to_string()}),
            ),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                json!({"error": "NotFound", "message": message}),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({"error": "RateLimited", "message": "Too many requests, slow down."}),
            ),
            AppError::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "ConfigurationError", "message": "upstream API key not configured"}),
            ),
            AppError::Upstream(UpstreamError::ModelNotFound { model, attempted }) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "ModelUnavailable",
                    "message": format!("Model '{model}' is not available, and no fallback model responded."),
                    "details": {"attempted": attempted},
                }),
            ),
            AppError::Upstream(UpstreamError::Client { status, detail }) => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST),
                json!({
                    "error": "UpstreamError",
                    "message": "upstream rejected the request",
                    "details": detail,
                }),
            ),
            AppError::Upstream(e) => {
                tracing::error!(error = %e, "upstream failure");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({"error": "UpstreamError", "message": "upstream model API failed"}),
                )
            }
            AppError::Store(e) => {
                tracing::error!(error = %e, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "StorageError", "message": "persistence failed"}),
                )
            }
            AppError::Tts(TtsError::Unavailable) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({"error": "TtsUnavailable", "message": "server TTS not available"}),
            ),
            AppError::Tts(e) => {
                tracing::error!(error = %e, "tts failure");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({"error": "TtsError", "message": "TTS stream failed"}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
