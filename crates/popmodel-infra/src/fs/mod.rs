//! File-backed JSON persistence.
//!
//! Every record is one pretty-printed JSON document on disk:
//!
//! ```text
//! {data_dir}/history/{user_key}/{session_id}.json
//! {data_dir}/memory/{user_key}.json
//! {data_dir}/popmodel.config.json
//! ```
//!
//! User keys and session ids are validated before they touch a path, so
//! request-supplied values can never escape the data directory.

pub mod memory;
pub mod model_config;
pub mod session;

use std::path::{Path, PathBuf};

use popmodel_types::error::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Environment variable overriding the data directory location.
pub const DATA_DIR_ENV: &str = "POPMODEL_DATA_DIR";

/// Resolve the data directory: `$POPMODEL_DATA_DIR`, else `~/.popmodel`,
/// else `./.popmodel` when no home directory can be determined.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    match dirs::home_dir() {
        Some(home) => home.join(".popmodel"),
        None => PathBuf::from(".popmodel"),
    }
}

/// Whether a request-supplied key is safe to embed in a file path.
///
/// Accepts the alphanumeric/dash/underscore alphabet our own generators
/// produce; rejects everything else, including separators and dots.
pub fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn checked(key: &str) -> Result<&str, StoreError> {
    if valid_key(key) {
        Ok(key)
    } else {
        Err(StoreError::InvalidId(key.to_string()))
    }
}

/// `{data_dir}/history/{user_key}/`
pub fn history_dir(data_dir: &Path, user_key: &str) -> Result<PathBuf, StoreError> {
    Ok(data_dir.join("history").join(checked(user_key)?))
}

/// `{data_dir}/history/{user_key}/{id}.json`
pub fn session_path(data_dir: &Path, user_key: &str, id: &str) -> Result<PathBuf, StoreError> {
    Ok(history_dir(data_dir, user_key)?.join(format!("{}.json", checked(id)?)))
}

/// `{data_dir}/memory/{user_key}.json`
pub fn memory_path(data_dir: &Path, user_key: &str) -> Result<PathBuf, StoreError> {
    Ok(data_dir.join("memory").join(format!("{}.json", checked(user_key)?)))
}

/// `{data_dir}/popmodel.config.json`
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("popmodel.config.json")
}

/// Write a value as pretty-printed JSON, creating parent directories.
pub(crate) async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, body).await?;
    Ok(())
}

/// Read and parse a JSON document. `Ok(None)` when the file is absent.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_key_accepts_generated_shapes() {
        assert!(valid_key("anon"));
        assert!(valid_key("user_108234567890"));
        assert!(valid_key("0192fd8e-0a1b-7c3d-9e4f-566778899aab"));
    }

    #[test]
    fn valid_key_rejects_path_traversal() {
        assert!(!valid_key(""));
        assert!(!valid_key(".."));
        assert!(!valid_key("../etc/passwd"));
        assert!(!valid_key("a/b"));
        assert!(!valid_key("a\\b"));
        assert!(!valid_key("id.json"));
        assert!(!valid_key(&"x".repeat(200)));
    }

    #[test]
    fn session_path_stays_under_history() {
        let path = session_path(Path::new("/data"), "anon", "abc-123").unwrap();
        assert_eq!(path, PathBuf::from("/data/history/anon/abc-123.json"));

        let err = session_path(Path::new("/data"), "anon", "../escape").unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }
}
