//! Explicit definition of the `miniapp_data` table.

use crate::StoreError;

pub const TABLE_NAME: &str = "miniapp_data";

/// Column type, independent of any SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    /// Fixed-width character column holding at most `n` characters.
    Char(usize),
    Timestamp,
}

/// Value the datastore fills in when the column is omitted from an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    /// Assigned by the datastore (auto-increment key).
    Generated,
    /// Insertion time.
    CurrentTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub primary_key: bool,
    pub default: Option<ColumnDefault>,
}

impl FieldDef {
    pub fn max_chars(&self) -> Option<usize> {
        match self.sql_type {
            SqlType::Char(n) => Some(n),
            _ => None,
        }
    }

    /// Reject values wider than the column.
    pub fn check(&self, value: Option<&str>) -> Result<(), StoreError> {
        match (self.max_chars(), value) {
            (Some(max), Some(v)) if v.chars().count() > max => Err(StoreError::Validation(
                format!("{} must be at most {} character(s)", self.name, max),
            )),
            _ => Ok(()),
        }
    }
}

/// Columns of the event table in declaration order. The full view serializes in this order.
pub const EVENT_FIELDS: &[FieldDef] = &[
    FieldDef {
        name: "id",
        sql_type: SqlType::Integer,
        nullable: false,
        primary_key: true,
        default: Some(ColumnDefault::Generated),
    },
    FieldDef {
        name: "status",
        sql_type: SqlType::Char(1),
        nullable: true,
        primary_key: false,
        default: None,
    },
    FieldDef {
        name: "created_at",
        sql_type: SqlType::Timestamp,
        nullable: false,
        primary_key: false,
        default: Some(ColumnDefault::CurrentTimestamp),
    },
    FieldDef {
        name: "updated_at",
        sql_type: SqlType::Timestamp,
        nullable: false,
        primary_key: false,
        default: Some(ColumnDefault::CurrentTimestamp),
    },
    FieldDef {
        name: "event",
        sql_type: SqlType::Char(8),
        nullable: true,
        primary_key: false,
        default: None,
    },
];

pub fn field(name: &str) -> Option<&'static FieldDef> {
    EVENT_FIELDS.iter().find(|f| f.name == name)
}

/// Width check for a caller-supplied column value. Unknown columns are rejected.
pub fn validate(name: &str, value: Option<&str>) -> Result<(), StoreError> {
    field(name)
        .ok_or_else(|| StoreError::Validation(format!("unknown field: {}", name)))?
        .check(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_one_character_wide() {
        assert!(validate("status", Some("A")).is_ok());
        assert!(validate("status", None).is_ok());
        assert!(validate("status", Some("")).is_ok());
        let err = validate("status", Some("AB")).unwrap_err();
        assert!(err.to_string().contains("status must be at most 1"));
    }

    #[test]
    fn event_width_counts_characters_not_bytes() {
        assert!(validate("event", Some("CREATE")).is_ok());
        assert!(validate("event", Some("ÉVÉNEMEN")).is_ok());
        assert!(validate("event", Some("TOOLONGEV")).is_err());
    }

    #[test]
    fn timestamps_carry_insertion_defaults() {
        for name in ["created_at", "updated_at"] {
            let f = field(name).unwrap();
            assert_eq!(f.default, Some(ColumnDefault::CurrentTimestamp));
            assert!(!f.nullable);
        }
        assert!(field("id").unwrap().primary_key);
        assert!(validate("nope", Some("x")).is_err());
    }
}
