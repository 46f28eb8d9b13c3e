//! Chat session and message types.
//!
//! A session is one conversation owned by a single user namespace. Messages
//! are append-only and chronological; `updated_at` is refreshed on every
//! mutation and is never earlier than `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Maximum length of a session title in characters.
pub const MAX_TITLE_LEN: usize = 80;

/// Who authored a message within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// Persisted reference to an image attached to a user message.
///
/// Inline base64 payloads are never written to disk; only the fact that a
/// payload accompanied the message (`has_data`) is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub has_data: bool,
}

/// A single message within a session. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: MessageRole,
    pub text: String,
    pub ts: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<StoredImage>>,
    /// Set on assistant messages produced in admin mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
}

/// A full conversation session, persisted as one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Session {
    /// Append a message and refresh `updated_at`.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Replace the title, trimming and clipping to [`MAX_TITLE_LEN`].
    pub fn set_title(&mut self, title: &str) {
        self.title = clip_title(title);
        self.updated_at = Utc::now();
    }

    /// Whether the session still carries a placeholder title and no
    /// messages, making it eligible for auto-titling from the first
    /// user text.
    pub fn wants_auto_title(&self) -> bool {
        let generic = matches!(
            self.title.trim().to_lowercase().as_str(),
            "new chat" | "chat" | ""
        );
        self.messages.is_empty() || generic
    }

    /// Summary view used by the history listing.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Trim a title and clip it to [`MAX_TITLE_LEN`] characters on a char
/// boundary.
pub fn clip_title(title: &str) -> String {
    title.trim().chars().take(MAX_TITLE_LEN).collect()
}

/// Listing view of a session: metadata without the message payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
