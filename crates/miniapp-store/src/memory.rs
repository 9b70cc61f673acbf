//! In-memory event store (process lifetime only).

use chrono::Utc;
use miniapp_types::{EventChanges, EventRecord, EventStore, NewEvent, StoreError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    /// Last id handed out; ids are never reused, even after deletes.
    last_id: i64,
    rows: BTreeMap<i64, EventRecord>,
}

/// In-memory implementation of EventStore. Each call holds the table lock for its whole
/// duration, so writes are atomic with respect to each other.
pub struct InMemoryEventStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::default())),
        }
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert(&self, new: &NewEvent) -> Result<EventRecord, StoreError> {
        new.validate()?;
        let mut table = self.table.write().await;
        table.last_id += 1;
        let now = Utc::now();
        let record = EventRecord {
            id: table.last_id,
            status: new.status.clone(),
            created_at: now,
            updated_at: now,
            event: new.event.clone(),
        };
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Option<EventRecord>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<EventRecord>, StoreError> {
        let table = self.table.read().await;
        // BTreeMap iterates by id, so the stable sort keeps id order among equal timestamps.
        let mut out: Vec<EventRecord> = table.rows.values().cloned().collect();
        out.sort_by_key(|r| r.updated_at);
        Ok(out)
    }

    async fn update(
        &self,
        id: i64,
        changes: &EventChanges,
    ) -> Result<Option<EventRecord>, StoreError> {
        changes.validate()?;
        let mut table = self.table.write().await;
        let Some(record) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if record.apply(changes) {
            record.updated_at = Utc::now().max(record.updated_at);
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn new_event(status: &str, event: &str) -> NewEvent {
        NewEvent {
            status: Some(status.to_string()),
            event: Some(event.to_string()),
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_equal_timestamps() {
        let store = InMemoryEventStore::new();
        let a = store.insert(&new_event("A", "CREATE")).await.unwrap();
        let b = store.insert(&new_event("A", "LOGIN")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(store.get(1).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = InMemoryEventStore::new();
        let a = store.insert(&new_event("A", "CREATE")).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        assert!(!store.delete(a.id).await.unwrap());
        let b = store.insert(&new_event("A", "CREATE")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_only() {
        let store = InMemoryEventStore::new();
        let a = store.insert(&new_event("A", "CREATE")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let changes = EventChanges {
            status: Some("B".to_string()),
            event: None,
        };
        let b = store.update(a.id, &changes).await.unwrap().unwrap();
        assert_eq!(b.status.as_deref(), Some("B"));
        assert_eq!(b.event, a.event);
        assert_eq!(b.created_at, a.created_at);
        assert!(b.updated_at > a.updated_at);

        assert_eq!(store.update(99, &changes).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_is_ordered_by_updated_at() {
        let store = InMemoryEventStore::new();
        let a = store.insert(&new_event("A", "CREATE")).await.unwrap();
        let b = store.insert(&new_event("A", "CREATE")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let changes = EventChanges {
            status: Some("C".to_string()),
            event: None,
        };
        store.update(a.id, &changes).await.unwrap();
        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn wide_values_are_rejected_without_writing() {
        let store = InMemoryEventStore::new();
        let err = store.insert(&new_event("AB", "CREATE")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.list().await.unwrap().is_empty());
    }
}
