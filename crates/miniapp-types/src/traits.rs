//! Store trait for event records and its error type.

use crate::{EventChanges, EventRecord, NewEvent};
use async_trait::async_trait;

/// Datastore abstraction for the `miniapp_data` table.
///
/// Implementations own `id`, `created_at` and `updated_at`: callers never supply them.
/// Each write is applied atomically; a failed write leaves the stored rows untouched.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new record and return it as stored.
    async fn insert(&self, new: &NewEvent) -> Result<EventRecord, StoreError>;

    /// Get one record by id.
    async fn get(&self, id: i64) -> Result<Option<EventRecord>, StoreError>;

    /// All records, ordered by `updated_at` ascending (ties broken by id).
    async fn list(&self) -> Result<Vec<EventRecord>, StoreError>;

    /// Apply the touched fields of `changes`. Returns `Ok(None)` when the id is unknown.
    async fn update(
        &self,
        id: i64,
        changes: &EventChanges,
    ) -> Result<Option<EventRecord>, StoreError>;

    /// Delete by id. Returns `false` when the id is unknown.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid event: {0}")]
    Validation(String),
    #[error("event store error: {0}")]
    Backend(String),
}
