// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler registry and the reducer.
//!
//! Handlers are keyed by exact event name; one optional catch-all runs
//! after the named handler. Reducing an event is all-or-nothing: a failing
//! handler leaves state unchanged for that event and surfaces an in-band
//! `error:occurred { kind: "handler" }` instead of its emissions.

use crate::error::HandlerRegistryError;
use reel_core::names::{self, ErrorOccurred};
use reel_core::{Event, Handler};
use std::collections::{HashMap, HashSet};

/// Outcome of dispatching one event through the registry.
///
/// Emitted events are already stamped with `caused_by` pointing at the
/// triggering event. They are never reduced synchronously.
#[derive(Debug, Clone)]
pub struct Reduction<S> {
    pub state: S,
    pub emitted: Vec<Event>,
}

/// Exact-name handler map plus one catch-all channel.
pub struct HandlerRegistry<S> {
    by_event: HashMap<String, Handler<S>>,
    catch_all: Option<Handler<S>>,
    names: HashSet<String>,
}

impl<S> Default for HandlerRegistry<S> {
    fn default() -> Self {
        Self {
            by_event: HashMap::new(),
            catch_all: None,
            names: HashSet::new(),
        }
    }
}

impl<S> HandlerRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_handlers(
        handlers: impl IntoIterator<Item = Handler<S>>,
    ) -> Result<Self, HandlerRegistryError> {
        let mut registry = Self::new();
        for handler in handlers {
            registry.register(handler)?;
        }
        Ok(registry)
    }

    /// Register a handler. At most one handler per event name, one
    /// catch-all, and unique handler names.
    pub fn register(&mut self, handler: Handler<S>) -> Result<(), HandlerRegistryError> {
        if !self.names.insert(handler.name().to_string()) {
            return Err(HandlerRegistryError::DuplicateName(
                handler.name().to_string(),
            ));
        }
        match handler.event_name() {
            None => {
                if let Some(existing) = &self.catch_all {
                    return Err(HandlerRegistryError::DuplicateCatchAll(
                        existing.name().to_string(),
                    ));
                }
                self.catch_all = Some(handler);
            }
            Some(event_name) => {
                if self.by_event.contains_key(event_name) {
                    return Err(HandlerRegistryError::DuplicateEvent(event_name.to_string()));
                }
                self.by_event.insert(event_name.to_string(), handler);
            }
        }
        Ok(())
    }

    pub fn handler_for(&self, event_name: &str) -> Option<&Handler<S>> {
        self.by_event.get(event_name)
    }

    pub fn catch_all(&self) -> Option<&Handler<S>> {
        self.catch_all.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.by_event.is_empty() && self.catch_all.is_none()
    }
}

impl<S: Clone> HandlerRegistry<S> {
    /// Reduce one event: the named handler first, then the catch-all.
    ///
    /// Unknown events without a catch-all are a warning, not a failure.
    /// A handler error reverts state to the input and replaces emissions
    /// with an `error:occurred` record.
    pub fn reduce(&self, event: &Event, state: S) -> Reduction<S> {
        let named = self.by_event.get(&event.name);
        if named.is_none() && self.catch_all.is_none() {
            tracing::warn!(event = %event.log_summary(), "no handler for event");
            return Reduction {
                state,
                emitted: Vec::new(),
            };
        }

        let before = state.clone();
        let mut current = state;
        let mut emitted = Vec::new();
        for handler in named.into_iter().chain(self.catch_all.as_ref()) {
            match handler.run(event, current) {
                Ok(result) => {
                    current = result.state;
                    emitted.extend(result.events);
                }
                Err(err) => {
                    tracing::warn!(
                        handler = handler.name(),
                        event = %event.log_summary(),
                        error = %err,
                        "handler failed; state unchanged for this event"
                    );
                    return Reduction {
                        state: before,
                        emitted: error_event(handler.name(), &err, event),
                    };
                }
            }
        }

        for emitted_event in &mut emitted {
            if emitted_event.caused_by.is_none() {
                emitted_event.caused_by = Some(event.id);
            }
        }
        Reduction {
            state: current,
            emitted,
        }
    }
}

fn error_event(
    handler_name: &str,
    err: &reel_core::HandlerError,
    trigger: &Event,
) -> Vec<Event> {
    let payload = ErrorOccurred {
        agent_name: None,
        kind: "handler".into(),
        message: format!("{handler_name}: {err}"),
        retryable: false,
    };
    match names::ERROR_OCCURRED.create_caused_by(payload, trigger.id) {
        Ok(event) => vec![event],
        Err(create_err) => {
            tracing::error!(error = %create_err, "failed to build error:occurred event");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
