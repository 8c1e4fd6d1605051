// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Causality lineage over an event log.
//!
//! `caused_by` references always point at earlier events in the same
//! session, so the relation is a DAG by construction. [`Lineage`] indexes
//! a log for provenance walks; [`verify_causality`] checks the structural
//! rules a well-formed log satisfies.

use crate::event::{Event, EventId};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Structural violations in an event log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CausalityError {
    #[error("event {event} repeats id {id}")]
    DuplicateId { event: String, id: EventId },
    #[error("event {event} references cause {cause} which is not an earlier event")]
    DanglingCause { event: String, cause: EventId },
}

/// Check that ids are unique and every `caused_by` references an earlier
/// event in the log.
pub fn verify_causality(events: &[Event]) -> Result<(), CausalityError> {
    let mut prior: HashSet<EventId> = HashSet::with_capacity(events.len());
    for event in events {
        if let Some(cause) = event.caused_by {
            if !prior.contains(&cause) {
                return Err(CausalityError::DanglingCause {
                    event: event.name.clone(),
                    cause,
                });
            }
        }
        if !prior.insert(event.id) {
            return Err(CausalityError::DuplicateId {
                event: event.name.clone(),
                id: event.id,
            });
        }
    }
    Ok(())
}

/// An id-indexed view of a log for provenance queries.
pub struct Lineage<'a> {
    events: &'a [Event],
    by_id: HashMap<EventId, &'a Event>,
}

impl<'a> Lineage<'a> {
    pub fn new(events: &'a [Event]) -> Self {
        let by_id = events.iter().map(|event| (event.id, event)).collect();
        Self { events, by_id }
    }

    pub fn get(&self, id: EventId) -> Option<&'a Event> {
        self.by_id.get(&id).copied()
    }

    /// The chain of causes from `id` back to its root, nearest first.
    pub fn ancestors(&self, id: EventId) -> Vec<&'a Event> {
        let mut chain = Vec::new();
        let mut cursor = self.get(id).and_then(|event| event.caused_by);
        while let Some(cause) = cursor {
            let Some(event) = self.get(cause) else { break };
            chain.push(event);
            cursor = event.caused_by;
        }
        chain
    }

    /// Events directly caused by `id`, in log order.
    pub fn children(&self, id: EventId) -> Vec<&'a Event> {
        self.events
            .iter()
            .filter(|event| event.caused_by == Some(id))
            .collect()
    }

    /// Events with no cause: external inputs.
    pub fn roots(&self) -> Vec<&'a Event> {
        self.events
            .iter()
            .filter(|event| event.caused_by.is_none())
            .collect()
    }

    /// The root ancestor of `id` (itself when it has no cause).
    pub fn root_of(&self, id: EventId) -> Option<&'a Event> {
        let event = self.get(id)?;
        Some(self.ancestors(id).last().copied().unwrap_or(event))
    }
}

#[cfg(test)]
#[path = "causality_tests.rs"]
mod tests;
