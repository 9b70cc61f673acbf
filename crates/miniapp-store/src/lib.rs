//! EventStore backends: in-memory and (feature `sqlite`) SQLite.

mod memory;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::InMemoryEventStore;
pub use miniapp_types::{EventChanges, EventRecord, EventStore, NewEvent, StoreError};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteEventStore;
