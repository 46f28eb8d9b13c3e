//! Persistence trait definitions.
//!
//! Implementations live in `popmodel-infra` (file-backed JSON documents).
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).
//!
//! Sessions and memory are partitioned by user namespace: a `user_key`
//! derived from verified identity, or the fixed `anon` namespace when auth
//! is disabled. Operations on one namespace never observe another's data.

use popmodel_types::error::StoreError;
use popmodel_types::memory::UserMemory;
use popmodel_types::session::{Session, SessionSummary};

/// Repository trait for per-user session persistence.
pub trait SessionStore: Send + Sync {
    /// List session summaries for a user, ordered by `updated_at` descending.
    ///
    /// Malformed persisted records are skipped, never fatal to the listing.
    fn list(
        &self,
        user_key: &str,
    ) -> impl std::future::Future<Output = Result<Vec<SessionSummary>, StoreError>> + Send;

    /// Create a new session with a freshly generated unique id.
    fn create(
        &self,
        user_key: &str,
        title: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Session, StoreError>> + Send;

    /// Load a session by id; `None` when absent.
    fn load(
        &self,
        user_key: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Overwrite the persisted record for the session's id.
    fn save(
        &self,
        user_key: &str,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete a session. Deleting an absent session is not an error.
    fn delete(
        &self,
        user_key: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete every session in the namespace, returning the count removed.
    fn clear(
        &self,
        user_key: &str,
    ) -> impl std::future::Future<Output = Result<usize, StoreError>> + Send;
}

/// Repository trait for per-user memory persistence.
pub trait MemoryStore: Send + Sync {
    /// Read the memory record, falling back to an empty one when absent
    /// or unreadable. Memory is advisory; reads never fail.
    fn read(
        &self,
        user_key: &str,
    ) -> impl std::future::Future<Output = UserMemory> + Send;

    /// Overwrite the memory record.
    fn write(
        &self,
        user_key: &str,
        memory: &UserMemory,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Durable storage for the process-wide current-model selection.
pub trait ModelConfigStore: Send + Sync {
    /// Load the persisted model selection, if any.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Persist the model selection.
    fn save(
        &self,
        model: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
