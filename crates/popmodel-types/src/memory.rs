//! Lightweight per-user memory.
//!
//! One record per user namespace, mined heuristically from chat text. This
//! is advisory personalization context, not authoritative state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of notes retained per user; oldest are evicted first.
pub const MAX_NOTES: usize = 20;

/// Persisted memory for one user namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMemory {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for UserMemory {
    fn default() -> Self {
        Self {
            name: None,
            notes: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

impl UserMemory {
    /// Append a note if not already present, evicting the oldest entries
    /// beyond [`MAX_NOTES`]. Returns whether the memory changed.
    pub fn push_note(&mut self, note: String) -> bool {
        if note.is_empty() || self.notes.contains(&note) {
            return false;
        }
        self.notes.push(note);
        if self.notes.len() > MAX_NOTES {
            let excess = self.notes.len() - MAX_NOTES;
            self.notes.drain(..excess);
        }
        self.updated_at = Utc::now();
        true
    }

    /// Whether there is anything worth injecting into a system prompt.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.notes.is_empty()
    }
}
