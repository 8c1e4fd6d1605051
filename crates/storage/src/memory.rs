// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory event store.

use crate::store::{EventStore, SessionMeta, StateSnapshot, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use reel_core::{Event, EventId, SessionId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Default)]
struct SessionLog {
    events: Vec<Event>,
    snapshots: Vec<StateSnapshot>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, SessionLog>,
    /// Store-wide id set; duplicate appends are rejected across sessions.
    seen: HashSet<EventId>,
}

/// Process-lifetime event store.
///
/// Also keeps per-position state snapshots, which the runtime records
/// while a session is live.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn append(&self, session: &SessionId, event: &Event) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if !inner.seen.insert(event.id) {
            return Err(StoreError::WriteFailed(format!(
                "duplicate event id {}",
                event.id
            )));
        }
        inner
            .sessions
            .entry(session.clone())
            .or_default()
            .events
            .push(event.clone());
        Ok(())
    }

    async fn events(&self, session: &SessionId) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .sessions
            .get(session)
            .map(|log| log.events.clone())
            .unwrap_or_default())
    }

    async fn sessions(&self) -> Result<Vec<SessionMeta>, StoreError> {
        let inner = self.inner.lock();
        let mut metas: Vec<SessionMeta> = inner
            .sessions
            .iter()
            .filter_map(|(id, log)| {
                let first = log.events.first()?;
                let last = log.events.last()?;
                Some(SessionMeta {
                    id: id.clone(),
                    created_at: first.timestamp,
                    last_event_at: last.timestamp,
                    event_count: log.events.len() as u64,
                })
            })
            .collect();
        metas.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(metas)
    }

    async fn clear(&self, session: &SessionId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if let Some(log) = inner.sessions.remove(session) {
            for event in &log.events {
                inner.seen.remove(&event.id);
            }
        }
        Ok(())
    }

    async fn snapshot(
        &self,
        session: &SessionId,
        position: usize,
    ) -> Result<Option<StateSnapshot>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.sessions.get(session).and_then(|log| {
            log.snapshots
                .iter()
                .find(|snap| snap.position == position)
                .cloned()
        }))
    }

    async fn record_snapshot(
        &self,
        session: &SessionId,
        snapshot: StateSnapshot,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let log = inner.sessions.entry(session.clone()).or_default();
        // Latest write wins for a given position.
        log.snapshots.retain(|snap| snap.position != snapshot.position);
        log.snapshots.push(snapshot);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
