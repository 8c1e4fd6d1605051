// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The atomic event record and typed event definitions.

use crate::error::EventError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Unique identifier for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generate a fresh random id.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its canonical string form.
    pub fn parse(s: &str) -> Result<Self, EventError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| EventError::InvalidId(s.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex characters, for log lines.
    pub fn short(&self) -> String {
        let mut s = self.0.to_string();
        s.truncate(8);
        s
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable record of something that happened in a session.
///
/// Names follow the `domain:action` pattern. Literal names never contain
/// `*`; wildcarded forms are reserved for [`crate::pattern::Pattern`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<EventId>,
}

impl Event {
    /// Create an event with a fresh id and the current timestamp.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        let name = name.into();
        debug_assert!(
            !name.contains('*'),
            "wildcards are reserved for patterns, not event names: {name:?}"
        );
        Self {
            id: EventId::fresh(),
            name,
            payload,
            timestamp: Utc::now(),
            caused_by: None,
        }
    }

    /// Attribute this event to the event that caused it.
    pub fn caused_by(mut self, cause: EventId) -> Self {
        self.caused_by = Some(cause);
        self
    }

    /// One-line `{name} key=value` summary for log output.
    pub fn log_summary(&self) -> String {
        match self.caused_by {
            Some(cause) => format!(
                "{} id={} caused_by={}",
                self.name,
                self.id.short(),
                cause.short()
            ),
            None => format!("{} id={}", self.name, self.id.short()),
        }
    }
}

/// Typed definition of an event name and its payload shape.
///
/// A named event type has exactly one payload shape; payload unions are
/// encoded as separate names. Definitions are `const`-constructible so the
/// vocabulary of a workflow can live in statics:
///
/// ```
/// use reel_core::event::EventDef;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Moved { x: i64, y: i64 }
///
/// const MOVED: EventDef<Moved> = EventDef::new("cursor:moved");
/// let event = MOVED.create(Moved { x: 3, y: 4 }).unwrap();
/// assert!(MOVED.is(&event));
/// ```
pub struct EventDef<P> {
    name: &'static str,
    _payload: PhantomData<fn() -> P>,
}

impl<P> EventDef<P> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// True when `event` carries this definition's name.
    pub fn is(&self, event: &Event) -> bool {
        event.name == self.name
    }
}

impl<P: Serialize + DeserializeOwned> EventDef<P> {
    /// Create an event carrying `payload`.
    pub fn create(&self, payload: P) -> Result<Event, EventError> {
        let value = serde_json::to_value(&payload).map_err(|source| EventError::Serialize {
            name: self.name.to_string(),
            source,
        })?;
        Ok(Event::new(self.name, value))
    }

    /// Create an event attributed to `cause`.
    pub fn create_caused_by(&self, payload: P, cause: EventId) -> Result<Event, EventError> {
        Ok(self.create(payload)?.caused_by(cause))
    }

    /// Parse the typed payload out of `event`.
    ///
    /// Fails when the event carries a different name or the payload does
    /// not match the declared shape.
    pub fn payload(&self, event: &Event) -> Result<P, EventError> {
        if event.name != self.name {
            return Err(EventError::NameMismatch {
                expected: self.name,
                actual: event.name.clone(),
            });
        }
        serde_json::from_value(event.payload.clone()).map_err(|source| EventError::Parse {
            name: self.name.to_string(),
            source,
        })
    }
}

// PhantomData<fn() -> P> is Copy regardless of P.
impl<P> Clone for EventDef<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for EventDef<P> {}

impl<P> fmt::Debug for EventDef<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDef").field("name", &self.name).finish()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
