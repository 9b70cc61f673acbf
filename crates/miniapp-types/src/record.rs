//! Event record and its read-only views.

use crate::EventChanges;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of `miniapp_data`. Serializes as the full view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub event: Option<String>,
}

/// Listing projection: id, status and a link to the full view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: i64,
    pub status: Option<String>,
    pub url: String,
}

/// Path of the full view for `id`.
pub fn event_url(id: i64) -> String {
    format!("/events/{}", id)
}

impl EventRecord {
    pub fn url(&self) -> String {
        event_url(self.id)
    }

    pub fn summary(&self) -> EventSummary {
        EventSummary {
            id: self.id,
            status: self.status.clone(),
            url: self.url(),
        }
    }

    /// Copy the touched fields of `changes` into the record. Returns whether anything was applied.
    /// Timestamps are left to the store.
    pub fn apply(&mut self, changes: &EventChanges) -> bool {
        let mut touched = false;
        if let Some(ref status) = changes.status {
            self.status = Some(status.clone());
            touched = true;
        }
        if let Some(ref event) = changes.event {
            self.event = Some(event.clone());
            touched = true;
        }
        touched
    }
}
