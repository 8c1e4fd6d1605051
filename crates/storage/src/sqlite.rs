// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded-SQL event store.
//!
//! One file (or `:memory:`) per store. Events survive across store
//! instances pointing at the same file. The connection is synchronous and
//! shared behind a mutex; operations are short single-statement
//! transactions.

use crate::store::{EventStore, SessionMeta, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reel_core::{Event, EventId, SessionId};
use rusqlite::{params, Connection, ErrorCode};
use std::path::Path;
use std::sync::Arc;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    last_event_at TEXT NOT NULL,
    event_count INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    name TEXT NOT NULL,
    payload_json TEXT NOT NULL,
    timestamp_iso TEXT NOT NULL,
    caused_by TEXT,
    ordinal INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_session_ordinal
    ON events (session_id, ordinal);
";

/// SQLite-backed event store.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (creating if needed) a store at `path`. File-backed stores run
    /// in WAL mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(map_sqlite_err)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(map_sqlite_err)?;
        tracing::debug!(path = %path.display(), "opened sqlite event store");
        Self::init(conn)
    }

    /// Open a transient store that lives only as long as the connection.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(map_sqlite_err)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn append(&self, session: &SessionId, event: &Event) -> Result<(), StoreError> {
        let payload_json = serde_json::to_string(&event.payload)?;
        let timestamp_iso = event.timestamp.to_rfc3339();

        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(map_sqlite_err)?;

        let ordinal: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(ordinal) + 1, 0) FROM events WHERE session_id = ?1",
                params![session.as_str()],
                |row| row.get(0),
            )
            .map_err(map_sqlite_err)?;

        tx.execute(
            "INSERT INTO events (id, session_id, name, payload_json, timestamp_iso, caused_by, ordinal)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.id.to_string(),
                session.as_str(),
                event.name,
                payload_json,
                timestamp_iso,
                event.caused_by.map(|id| id.to_string()),
                ordinal,
            ],
        )
        .map_err(map_sqlite_err)?;

        tx.execute(
            "INSERT INTO sessions (id, created_at, last_event_at, event_count)
             VALUES (?1, ?2, ?2, 1)
             ON CONFLICT (id) DO UPDATE
             SET last_event_at = excluded.last_event_at,
                 event_count = event_count + 1",
            params![session.as_str(), timestamp_iso],
        )
        .map_err(map_sqlite_err)?;

        tx.commit().map_err(map_sqlite_err)
    }

    async fn events(&self, session: &SessionId) -> Result<Vec<Event>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, payload_json, timestamp_iso, caused_by
                 FROM events WHERE session_id = ?1 ORDER BY ordinal ASC",
            )
            .map_err(map_sqlite_err)?;
        let rows = stmt
            .query_map(params![session.as_str()], row_to_parts)
            .map_err(map_sqlite_err)?;

        let mut events = Vec::new();
        for row in rows {
            let (id, name, payload_json, timestamp_iso, caused_by) =
                row.map_err(map_sqlite_err)?;
            events.push(rehydrate(id, name, payload_json, timestamp_iso, caused_by)?);
        }
        Ok(events)
    }

    async fn sessions(&self) -> Result<Vec<SessionMeta>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, created_at, last_event_at, event_count
                 FROM sessions ORDER BY created_at ASC, id ASC",
            )
            .map_err(map_sqlite_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(map_sqlite_err)?;

        let mut metas = Vec::new();
        for row in rows {
            let (id, created_at, last_event_at, event_count) = row.map_err(map_sqlite_err)?;
            metas.push(SessionMeta {
                id: SessionId::new(id),
                created_at: parse_iso(&created_at)?,
                last_event_at: parse_iso(&last_event_at)?,
                event_count: event_count.max(0) as u64,
            });
        }
        Ok(metas)
    }

    async fn clear(&self, session: &SessionId) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(map_sqlite_err)?;
        tx.execute(
            "DELETE FROM events WHERE session_id = ?1",
            params![session.as_str()],
        )
        .map_err(map_sqlite_err)?;
        tx.execute(
            "DELETE FROM sessions WHERE id = ?1",
            params![session.as_str()],
        )
        .map_err(map_sqlite_err)?;
        tx.commit().map_err(map_sqlite_err)
    }
}

type EventRow = (String, String, String, String, Option<String>);

fn row_to_parts(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn rehydrate(
    id: String,
    name: String,
    payload_json: String,
    timestamp_iso: String,
    caused_by: Option<String>,
) -> Result<Event, StoreError> {
    let caused_by = caused_by
        .map(|raw| EventId::parse(&raw))
        .transpose()
        .map_err(|err| StoreError::Backend(err.to_string()))?;
    Ok(Event {
        id: EventId::parse(&id).map_err(|err| StoreError::Backend(err.to_string()))?,
        name,
        payload: serde_json::from_str(&payload_json)?,
        timestamp: parse_iso(&timestamp_iso)?,
        caused_by,
    })
}

fn parse_iso(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|err| StoreError::Backend(format!("bad timestamp {raw:?}: {err}")))
}

fn map_sqlite_err(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::WriteFailed(err.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
