//! SQLite-backed event store.
//!
//! The datastore owns both timestamps: column defaults stamp inserts and an
//! `AFTER UPDATE` trigger refreshes `updated_at` on every mutation.

use chrono::{DateTime, NaiveDateTime, Utc};
use miniapp_types::schema::{ColumnDefault, FieldDef, SqlType, EVENT_FIELDS, TABLE_NAME};
use miniapp_types::{EventChanges, EventRecord, EventStore, NewEvent, StoreError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Millisecond-precision UTC timestamp, as stored.
const SQL_NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const SELECT_COLUMNS: &str = "id, status, created_at, updated_at, event";

/// SQLite-backed event store. One connection, serialized behind a mutex.
pub struct SqliteEventStore {
    conn: std::sync::Mutex<Connection>,
}

impl SqliteEventStore {
    /// Open (or create) the database at `path`. `":memory:"` gives a private in-memory database.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Backend(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        tracing::debug!(table = TABLE_NAME, "creating event table if missing");
        conn.execute_batch(&format!(
            "{};\n{};",
            create_table_sql(),
            touch_trigger_sql()
        ))
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self {
            conn: std::sync::Mutex::new(conn),
        })
    }

    fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, rusqlite::Error>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Backend(format!("failed to acquire lock: {}", e)))?;
        f(&mut *conn).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

fn column_sql(field: &FieldDef) -> String {
    let mut col = match field.sql_type {
        SqlType::Integer => format!("{} INTEGER", field.name),
        SqlType::Char(n) => format!("{} CHAR({})", field.name, n),
        SqlType::Timestamp => format!("{} TEXT", field.name),
    };
    if field.primary_key {
        col.push_str(" PRIMARY KEY");
    }
    match field.default {
        // AUTOINCREMENT keeps SQLite from handing out the id of a deleted row again.
        Some(ColumnDefault::Generated) => col.push_str(" AUTOINCREMENT"),
        Some(ColumnDefault::CurrentTimestamp) => {
            col.push_str(&format!(" NOT NULL DEFAULT ({})", SQL_NOW));
            return col;
        }
        None => {}
    }
    if !field.nullable && !field.primary_key {
        col.push_str(" NOT NULL");
    }
    col
}

/// `CREATE TABLE` statement rendered from the shared schema definition.
pub(crate) fn create_table_sql() -> String {
    let columns: Vec<String> = EVENT_FIELDS.iter().map(column_sql).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        TABLE_NAME,
        columns.join(",\n    ")
    )
}

fn touch_trigger_sql() -> String {
    format!(
        "CREATE TRIGGER IF NOT EXISTS {table}_touch_updated_at
        AFTER UPDATE OF status, event ON {table}
        FOR EACH ROW
        BEGIN
            UPDATE {table} SET updated_at = {now} WHERE id = NEW.id;
        END",
        table = TABLE_NAME,
        now = SQL_NOW
    )
}

fn parse_ts(idx: usize, raw: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    NaiveDateTime::parse_from_str(&raw, TS_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn read_row(row: &Row) -> Result<EventRecord, rusqlite::Error> {
    Ok(EventRecord {
        id: row.get(0)?,
        status: row.get(1)?,
        created_at: parse_ts(2, row.get(2)?)?,
        updated_at: parse_ts(3, row.get(3)?)?,
        event: row.get(4)?,
    })
}

fn select_by_id(conn: &Connection, id: i64) -> Result<Option<EventRecord>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {} FROM {} WHERE id = ?1", SELECT_COLUMNS, TABLE_NAME),
        [id],
        read_row,
    )
    .optional()
}

#[async_trait::async_trait]
impl EventStore for SqliteEventStore {
    async fn insert(&self, new: &NewEvent) -> Result<EventRecord, StoreError> {
        new.validate()?;
        let record = self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                &format!("INSERT INTO {} (status, event) VALUES (?1, ?2)", TABLE_NAME),
                params![new.status, new.event],
            )?;
            let id = tx.last_insert_rowid();
            let record = select_by_id(&tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(record)
        })?;
        tracing::debug!(id = record.id, "inserted event row");
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Option<EventRecord>, StoreError> {
        self.with_conn(|conn| select_by_id(conn, id))
    }

    async fn list(&self) -> Result<Vec<EventRecord>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM {} ORDER BY updated_at, id",
                SELECT_COLUMNS, TABLE_NAME
            ))?;
            let rows = stmt.query_map([], read_row)?;
            rows.collect()
        })
    }

    async fn update(
        &self,
        id: i64,
        changes: &EventChanges,
    ) -> Result<Option<EventRecord>, StoreError> {
        changes.validate()?;
        if !changes.is_touched() {
            return self.get(id).await;
        }
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let n = tx.execute(
                &format!(
                    "UPDATE {} SET status = COALESCE(?1, status), event = COALESCE(?2, event) WHERE id = ?3",
                    TABLE_NAME
                ),
                params![changes.status, changes.event, id],
            )?;
            if n == 0 {
                return Ok(None);
            }
            let record = select_by_id(&tx, id)?;
            tx.commit()?;
            Ok(record)
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let n = tx.execute(&format!("DELETE FROM {} WHERE id = ?1", TABLE_NAME), [id])?;
            tx.commit()?;
            Ok(n > 0)
        })
    }
}
