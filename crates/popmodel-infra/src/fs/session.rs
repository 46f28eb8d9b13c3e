//! File-backed [`SessionStore`]: one JSON document per session.

use std::path::PathBuf;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use popmodel_core::store::SessionStore;
use popmodel_types::error::StoreError;
use popmodel_types::session::{Session, SessionSummary, clip_title};

use super::{history_dir, session_path};

/// Session repository rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FsSessionStore {
    data_dir: PathBuf,
}

impl FsSessionStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}

impl SessionStore for FsSessionStore {
    async fn list(&self, user_key: &str) -> Result<Vec<SessionSummary>, StoreError> {
        let dir = history_dir(&self.data_dir, user_key)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match super::read_json::<Session>(&path).await {
                Ok(Some(session)) => summaries.push(session.summary()),
                Ok(None) => {}
                Err(e) => {
                    // A corrupt record must not take down the listing.
                    warn!(path = %path.display(), error = %e, "skipping unreadable session file");
                }
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn create(&self, user_key: &str, title: Option<&str>) -> Result<Session, StoreError> {
        let now = Utc::now();
        let title = title
            .map(clip_title)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "New chat".to_string());
        let session = Session {
            id: Uuid::now_v7().to_string(),
            title,
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        };
        self.save(user_key, &session).await?;
        Ok(session)
    }

    async fn load(&self, user_key: &str, id: &str) -> Result<Option<Session>, StoreError> {
        let path = session_path(&self.data_dir, user_key, id)?;
        super::read_json(&path).await
    }

    async fn save(&self, user_key: &str, session: &Session) -> Result<(), StoreError> {
        let path = session_path(&self.data_dir, user_key, &session.id)?;
        super::write_json(&path, session).await
    }

    async fn delete(&self, user_key: &str, id: &str) -> Result<(), StoreError> {
        let path = session_path(&self.data_dir, user_key, id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self, user_key: &str) -> Result<usize, StoreError> {
        let dir = history_dir(&self.data_dir, user_key)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            tokio::fs::remove_file(&path).await?;
            removed += 1;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use popmodel_types::session::{Message, MessageRole};
    use tempfile::TempDir;

    fn store() -> (TempDir, FsSessionStore) {
        let dir = TempDir::new().unwrap();
        let store = FsSessionStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    fn user_message(text: &str) -> Message {
        Message {
            role: MessageRole::User,
            text: text.to_string(),
            ts: Utc::now(),
            images: None,
            admin: None,
        }
    }

    #[tokio::test]
    async fn create_then_load_round_trips() {
        let (_dir, store) = store();
        let created = store.create("anon", Some("  First chat  ")).await.unwrap();
        assert_eq!(created.title, "First chat");

        let loaded = store.load("anon", &created.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, created.id);
        assert_eq!(loaded.title, "First chat");
        assert!(loaded.messages.is_empty());
    }

    #[tokio::test]
    async fn create_defaults_blank_titles() {
        let (_dir, store) = store();
        let a = store.create("anon", None).await.unwrap();
        let b = store.create("anon", Some("   ")).await.unwrap();
        assert_eq!(a.title, "New chat");
        assert_eq!(b.title, "New chat");
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn save_persists_appended_messages() {
        let (_dir, store) = store();
        let mut session = store.create("anon", None).await.unwrap();
        session.push(user_message("hello"));
        store.save("anon", &session).await.unwrap();

        let loaded = store.load("anon", &session.id).await.unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.messages[0].text, "hello");
    }

    #[tokio::test]
    async fn list_orders_by_update_time_and_skips_corrupt_files() {
        let (dir, store) = store();
        let older = store.create("anon", Some("older")).await.unwrap();
        let mut newer = store.create("anon", Some("newer")).await.unwrap();
        newer.push(user_message("bump"));
        store.save("anon", &newer).await.unwrap();

        // A corrupt sibling must be skipped, not fatal.
        let corrupt = dir.path().join("history").join("anon").join("bad.json");
        std::fs::write(&corrupt, b"{ not json").unwrap();

        let summaries = store.list("anon").await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, newer.id);
        assert_eq!(summaries[1].id, older.id);
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let (_dir, store) = store();
        let session = store.create("user_1", Some("mine")).await.unwrap();

        assert!(store.load("user_2", &session.id).await.unwrap().is_none());
        assert!(store.list("user_2").await.unwrap().is_empty());
        assert_eq!(store.clear("user_2").await.unwrap(), 0);
        assert!(store.load("user_1", &session.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = store();
        let session = store.create("anon", None).await.unwrap();
        store.delete("anon", &session.id).await.unwrap();
        store.delete("anon", &session.id).await.unwrap();
        assert!(store.load("anon", &session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_counts_removed_sessions() {
        let (_dir, store) = store();
        store.create("anon", None).await.unwrap();
        store.create("anon", None).await.unwrap();
        assert_eq!(store.clear("anon").await.unwrap(), 2);
        assert_eq!(store.clear("anon").await.unwrap(), 0);
        assert!(store.list("anon").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn traversal_ids_are_rejected() {
        let (_dir, store) = store();
        let err = store.load("anon", "../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }
}
