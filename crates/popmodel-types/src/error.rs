use thiserror::Error;

/// Errors from the file-backed session/memory/config stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session not found")]
    NotFound,

    #[error("invalid record id: '{0}'")]
    InvalidId(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Errors from the upstream model gateway.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream credential is not configured. Fatal to the endpoint.
    #[error("upstream API key missing")]
    MissingCredential,

    /// The request carried no text and no images.
    #[error("request has no content")]
    EmptyContent,

    /// The requested model does not exist upstream and every fallback
    /// candidate also failed.
    #[error("model '{model}' is not available, and fallbacks failed")]
    ModelNotFound {
        model: String,
        attempted: Vec<String>,
    },

    /// The upstream rejected the request (4xx other than model-not-found).
    #[error("upstream rejected request with status {status}")]
    Client {
        status: u16,
        detail: serde_json::Value,
    },

    /// Upstream 5xx. Detail is logged, never forwarded to callers.
    #[error("upstream server error (status {status})")]
    Server { status: u16 },

    /// Transport-level failure (timeout, DNS, connection reset).
    #[error("upstream transport error: {0}")]
    Transport(String),
}

/// Authentication and authorization failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth required")]
    MissingToken,

    #[error("invalid identity token")]
    InvalidToken,

    #[error("invalid code")]
    InvalidAdminCode,
}

/// Text-to-speech proxy failures.
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("server TTS not available")]
    Unavailable,

    #[error("invalid text: {0}")]
    InvalidText(String),

    #[error("TTS stream error: {0}")]
    Upstream(String),
}
