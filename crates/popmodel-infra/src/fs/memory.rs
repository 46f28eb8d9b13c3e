//! File-backed [`MemoryStore`]: one JSON document per user namespace.

use std::path::PathBuf;

use tracing::warn;

use popmodel_core::store::MemoryStore;
use popmodel_types::error::StoreError;
use popmodel_types::memory::UserMemory;

use super::memory_path;

#[derive(Debug, Clone)]
pub struct FsMemoryStore {
    data_dir: PathBuf,
}

impl FsMemoryStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}

impl MemoryStore for FsMemoryStore {
    async fn read(&self, user_key: &str) -> UserMemory {
        let path = match memory_path(&self.data_dir, user_key) {
            Ok(path) => path,
            Err(e) => {
                warn!(user_key, error = %e, "invalid memory key");
                return UserMemory::default();
            }
        };
        match super::read_json::<UserMemory>(&path).await {
            Ok(Some(memory)) => memory,
            Ok(None) => UserMemory::default(),
            Err(e) => {
                // Memory is advisory; an unreadable record degrades to empty.
                warn!(path = %path.display(), error = %e, "unreadable memory file");
                UserMemory::default()
            }
        }
    }

    async fn write(&self, user_key: &str, memory: &UserMemory) -> Result<(), StoreError> {
        let path = memory_path(&self.data_dir, user_key)?;
        super::write_json(&path, memory).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FsMemoryStore) {
        let dir = TempDir::new().unwrap();
        let store = FsMemoryStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[tokio::test]
    async fn missing_record_reads_as_empty() {
        let (_dir, store) = store();
        let memory = store.read("anon").await;
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let (_dir, store) = store();
        let mut memory = UserMemory::default();
        memory.name = Some("Ada".to_string());
        memory.push_note("likes tea".to_string());
        store.write("anon", &memory).await.unwrap();

        let loaded = store.read("anon").await;
        assert_eq!(loaded.name.as_deref(), Some("Ada"));
        assert_eq!(loaded.notes, vec!["likes tea"]);
    }

    #[tokio::test]
    async fn corrupt_record_degrades_to_empty() {
        let (dir, store) = store();
        let path = dir.path().join("memory").join("anon.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not json").unwrap();

        let memory = store.read("anon").await;
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let (_dir, store) = store();
        let mut memory = UserMemory::default();
        memory.name = Some("Ada".to_string());
        store.write("user_1", &memory).await.unwrap();

        assert!(store.read("user_2").await.is_empty());
        assert_eq!(store.read("user_1").await.name.as_deref(), Some("Ada"));
    }
}
