// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reel_core::{Event, EventId, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Store failures. `WriteFailed` is fatal for the current run; everything
/// a caller can sensibly tolerate (unknown sessions, missing snapshots) is
/// modeled as data, not as an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "NOT_FOUND",
            StoreError::WriteFailed(_) => "WRITE_FAILED",
            StoreError::Serialize(_) => "SERIALIZE_FAILED",
            StoreError::Backend(_) => "BACKEND_ERROR",
        }
    }
}

/// Metadata derived from a session's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub id: SessionId,
    /// Timestamp of the first appended event.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recently appended event.
    pub last_event_at: DateTime<Utc>,
    pub event_count: u64,
}

/// State captured after reducing the event at `position`.
///
/// Snapshots are an optimization; replay from the log alone is always
/// possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub state: Value,
    pub position: usize,
    pub event_id: EventId,
}

/// Append-only event log per session, with metadata and clear.
///
/// Reads of a session's events return the identical sequence on every call
/// between writes, preserving `caused_by` attribution. Stores are the only
/// mutable resource shared across replays; implementations serialize access
/// per session.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append one event to a session's log.
    ///
    /// A duplicate `event.id` within the same store is a
    /// [`StoreError::WriteFailed`].
    async fn append(&self, session: &SessionId, event: &Event) -> Result<(), StoreError>;

    /// A session's events in insertion order; empty for unknown sessions.
    async fn events(&self, session: &SessionId) -> Result<Vec<Event>, StoreError>;

    /// Metadata for every known session, ordered by creation time.
    async fn sessions(&self) -> Result<Vec<SessionMeta>, StoreError>;

    /// Remove all events and metadata for one session; no-op when unknown.
    async fn clear(&self, session: &SessionId) -> Result<(), StoreError>;

    /// Retrieve a snapshot at `position`, when the store keeps snapshots.
    async fn snapshot(
        &self,
        session: &SessionId,
        position: usize,
    ) -> Result<Option<StateSnapshot>, StoreError> {
        let _ = (session, position);
        Ok(None)
    }

    /// Record a snapshot. Stores without snapshot support ignore this.
    async fn record_snapshot(
        &self,
        session: &SessionId,
        snapshot: StateSnapshot,
    ) -> Result<(), StoreError> {
        let _ = (session, snapshot);
        Ok(())
    }
}
