//! Heuristic per-user memory extraction.
//!
//! A small ordered table of (pattern, action) rules, evaluated first-match
//! wins against the spelling-corrected inbound user text. Runs after a
//! successful upstream exchange; failures here are logged and must never
//! block message delivery.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use popmodel_types::memory::UserMemory;

use crate::store::MemoryStore;

/// A single extracted mutation of user memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryUpdate {
    /// Wipe the whole record.
    ClearAll,
    /// Clear the remembered name only.
    ForgetName,
    /// Remember the user's name.
    SetName(String),
    /// Append a free-form note.
    AddNote(String),
    /// Append a preference, stored with a `pref:` prefix.
    AddPreference(String),
}

/// What a matched rule turns its captures into.
#[derive(Debug, Clone, Copy)]
enum RuleAction {
    ClearAll,
    ForgetName,
    SetName,
    AddNote,
    AddPreference,
}

/// The ordered rule table. First match wins.
static RULES: LazyLock<Vec<(Regex, RuleAction)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b(clear|reset) (my )?memory\b").unwrap(),
            RuleAction::ClearAll,
        ),
        (
            Regex::new(r"(?i)\bforget (my )?name\b").unwrap(),
            RuleAction::ForgetName,
        ),
        (
            Regex::new(r"(?i)\b(?:my name is|call me)\s+([a-zA-Z][\w'-]{1,40})\b").unwrap(),
            RuleAction::SetName,
        ),
        (
            Regex::new(r"(?i)\bremember that\s+(.{5,200})$").unwrap(),
            RuleAction::AddNote,
        ),
        (
            Regex::new(r"(?i)\bI like\s+(.{3,80})$").unwrap(),
            RuleAction::AddPreference,
        ),
    ]
});

/// Run the rule table against one user message.
///
/// Pure: no I/O, no clock. Returns the first matching update, or `None`
/// when the text carries nothing memorable.
pub fn extract(text: &str) -> Option<MemoryUpdate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for (pattern, action) in RULES.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let update = match action {
            RuleAction::ClearAll => MemoryUpdate::ClearAll,
            RuleAction::ForgetName => MemoryUpdate::ForgetName,
            RuleAction::SetName => MemoryUpdate::SetName(caps[1].to_string()),
            RuleAction::AddNote => MemoryUpdate::AddNote(caps[1].trim().to_string()),
            RuleAction::AddPreference => {
                MemoryUpdate::AddPreference(caps[1].trim().to_string())
            }
        };
        return Some(update);
    }
    None
}

/// Apply an update to a memory record. Returns whether anything changed.
pub fn apply(memory: &mut UserMemory, update: &MemoryUpdate) -> bool {
    match update {
        MemoryUpdate::ClearAll => {
            *memory = UserMemory::default();
            true
        }
        MemoryUpdate::ForgetName => {
            memory.name = None;
            memory.updated_at = chrono::Utc::now();
            true
        }
        MemoryUpdate::SetName(name) => {
            memory.name = Some(name.clone());
            memory.updated_at = chrono::Utc::now();
            true
        }
        MemoryUpdate::AddNote(note) => memory.push_note(note.clone()),
        MemoryUpdate::AddPreference(pref) => memory.push_note(format!("pref: {pref}")),
    }
}

/// Extract from `text` and persist any resulting change.
///
/// Best-effort by contract: store failures are logged at warn and
/// swallowed, so a storage fault never hides a successful model reply.
pub async fn update_from_text<M: MemoryStore>(store: &M, user_key: &str, text: &str) {
    let Some(update) = extract(text) else {
        return;
    };
    let mut memory = store.read(user_key).await;
    if apply(&mut memory, &update)
        && let Err(err) = store.write(user_key, &memory).await
    {
        warn!(user_key = %user_key, error = %err, "failed to persist memory update");
    }
}

/// Render the memory-derived system prompt block, or `None` when the
/// record carries nothing.
pub fn memory_context(memory: &UserMemory) -> Option<String> {
    if memory.is_empty() {
        return None;
    }
    let mut lines = Vec::new();
    if let Some(name) = &memory.name {
        lines.push(format!("User name: {name}"));
    }
    if !memory.notes.is_empty() {
        lines.push(format!("Notes: {}", memory.notes.join("; ")));
    }
    Some(format!(
        "Use the following persistent user memory to personalize responses when helpful. \
         Do not assume facts beyond this.\n{}",
        lines.join("\n")
    ))
}
