//! Request and response bodies, plus the store-facing inputs they convert into.

use crate::schema;
use crate::StoreError;
use serde::{Deserialize, Serialize};

/// Values for a new row. `None` is stored as NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEvent {
    pub status: Option<String>,
    pub event: Option<String>,
}

impl NewEvent {
    pub fn validate(&self) -> Result<(), StoreError> {
        schema::validate("status", self.status.as_deref())?;
        schema::validate("event", self.event.as_deref())
    }
}

/// Fields a partial update sets. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub status: Option<String>,
    pub event: Option<String>,
}

impl EventChanges {
    /// Whether the update would write anything at all.
    pub fn is_touched(&self) -> bool {
        self.status.is_some() || self.event.is_some()
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        schema::validate("status", self.status.as_deref())?;
        schema::validate("event", self.event.as_deref())
    }
}

/// `POST /events` body. Absent keys fall back to `"A"` / `"CREATE"`; an explicit null stays null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    #[serde(default = "default_status")]
    pub status: Option<String>,
    #[serde(default = "default_event")]
    pub event: Option<String>,
}

fn default_status() -> Option<String> {
    Some("A".to_string())
}

fn default_event() -> Option<String> {
    Some("CREATE".to_string())
}

impl From<CreateEventRequest> for NewEvent {
    fn from(req: CreateEventRequest) -> Self {
        Self {
            status: req.status,
            event: req.event,
        }
    }
}

/// `POST /new-event-form` fields. No defaulting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEventForm {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
}

impl From<NewEventForm> for NewEvent {
    fn from(form: NewEventForm) -> Self {
        Self {
            status: form.status,
            event: form.event,
        }
    }
}

/// `PATCH /events/<id>` body. Values are kept raw so any JSON type can be judged for truthiness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchEventRequest {
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub event: Option<serde_json::Value>,
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` count as not supplied.
fn is_falsy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn patch_field(name: &str, value: Option<serde_json::Value>) -> Result<Option<String>, StoreError> {
    match value {
        None => Ok(None),
        Some(v) if is_falsy(&v) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(StoreError::Validation(format!("{} must be a string", name))),
    }
}

impl TryFrom<PatchEventRequest> for EventChanges {
    type Error = StoreError;

    fn try_from(req: PatchEventRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            status: patch_field("status", req.status)?,
            event: patch_field("event", req.event)?,
        })
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingResponse {
    pub what_to_see_here: String,
    pub check_rather: String,
}

/// Body of a successful `DELETE /events/<id>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: bool,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_only_missing_keys() {
        let req: CreateEventRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.status.as_deref(), Some("A"));
        assert_eq!(req.event.as_deref(), Some("CREATE"));

        let req: CreateEventRequest =
            serde_json::from_str(r#"{"status": null, "event": "LOGIN"}"#).unwrap();
        assert_eq!(req.status, None);
        assert_eq!(req.event.as_deref(), Some("LOGIN"));
    }

    #[test]
    fn patch_with_falsy_values_is_untouched() {
        for body in [
            r#"{"status": "", "event": null}"#,
            r#"{"status": false}"#,
            r#"{"status": 0, "event": false}"#,
            r#"{"event": []}"#,
            r#"{"status": {}, "event": 0.0}"#,
        ] {
            let req: PatchEventRequest = serde_json::from_str(body).unwrap();
            let changes = EventChanges::try_from(req).unwrap();
            assert!(!changes.is_touched(), "{} should not touch the record", body);
        }

        let req: PatchEventRequest = serde_json::from_str(r#"{"status": "B"}"#).unwrap();
        let changes = EventChanges::try_from(req).unwrap();
        assert!(changes.is_touched());
        assert_eq!(changes.status.as_deref(), Some("B"));
        assert_eq!(changes.event, None);
    }

    #[test]
    fn patch_with_truthy_non_string_is_invalid() {
        let req: PatchEventRequest = serde_json::from_str(r#"{"status": 5}"#).unwrap();
        let err = EventChanges::try_from(req).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref m) if m == "status must be a string"));

        let req: PatchEventRequest = serde_json::from_str(r#"{"event": true}"#).unwrap();
        assert!(EventChanges::try_from(req).is_err());
    }

    #[test]
    fn new_event_rejects_wide_values() {
        let ok = NewEvent {
            status: Some("A".into()),
            event: Some("CREATE".into()),
        };
        assert!(ok.validate().is_ok());
        let bad = NewEvent {
            status: Some("AA".into()),
            event: None,
        };
        assert!(matches!(bad.validate(), Err(StoreError::Validation(_))));
    }
}
