// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure reducer definitions.
//!
//! A handler maps `(event, state)` to a new state plus zero or more
//! emitted events. Events are facts about what happened; state is derived
//! from those facts, so handlers must be deterministic: no wall-clock
//! reads, no unseeded randomness. Emitted events are never reduced
//! synchronously; the runtime enqueues them for later dispatch.

use crate::error::HandlerError;
use crate::event::{Event, EventDef};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Outcome of reducing a single event.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResult<S> {
    pub state: S,
    pub events: Vec<Event>,
}

impl<S> HandlerResult<S> {
    /// A result that only transitions state.
    pub fn state(state: S) -> Self {
        Self {
            state,
            events: Vec::new(),
        }
    }

    /// A result that transitions state and emits events.
    pub fn with_events(state: S, events: Vec<Event>) -> Self {
        Self { state, events }
    }
}

pub type HandlerFn<S> = dyn Fn(&Event, S) -> Result<HandlerResult<S>, HandlerError> + Send + Sync;

/// A named, pure reducer bound to one event name or the catch-all channel.
pub struct Handler<S> {
    name: String,
    event_name: Option<String>,
    run: Box<HandlerFn<S>>,
}

impl<S> Handler<S> {
    /// Bind a reducer to a typed event definition.
    pub fn for_event<P, F>(def: &EventDef<P>, name: impl Into<String>, run: F) -> Self
    where
        P: Serialize + DeserializeOwned,
        F: Fn(&Event, S) -> Result<HandlerResult<S>, HandlerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            event_name: Some(def.name().to_string()),
            run: Box::new(run),
        }
    }

    /// Bind a reducer to an event name.
    pub fn named<F>(event_name: impl Into<String>, name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&Event, S) -> Result<HandlerResult<S>, HandlerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            event_name: Some(event_name.into()),
            run: Box::new(run),
        }
    }

    /// A catch-all reducer, called for every event after any named handler.
    pub fn catch_all<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&Event, S) -> Result<HandlerResult<S>, HandlerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            event_name: None,
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event name this handler reduces; `None` for the catch-all.
    pub fn event_name(&self) -> Option<&str> {
        self.event_name.as_deref()
    }

    pub fn is_catch_all(&self) -> bool {
        self.event_name.is_none()
    }

    pub fn run(&self, event: &Event, state: S) -> Result<HandlerResult<S>, HandlerError> {
        (self.run)(event, state)
    }
}

impl<S> fmt::Debug for Handler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("event_name", &self.event_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
