// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replay and time travel.
//!
//! A tape is an immutable cursor over a session's event log. State at any
//! position is the reducer fold of the prefix ending there; emissions are
//! ignored during replay because the log already contains them. Every
//! `step*` operation returns a new tape and leaves the original untouched.

use crate::handlers::HandlerRegistry;
use reel_core::Event;
use std::sync::Arc;

/// Immutable cursor computing state from a prefix of an event log.
///
/// `position` is the index of the last applied event (0-based). A
/// non-empty tape always has at least its first event applied; a fresh
/// tape starts fully played.
pub struct Tape<S> {
    events: Arc<[Event]>,
    handlers: Arc<HandlerRegistry<S>>,
    initial: S,
    position: usize,
    state: S,
}

impl<S: Clone> Clone for Tape<S> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            handlers: self.handlers.clone(),
            initial: self.initial.clone(),
            position: self.position,
            state: self.state.clone(),
        }
    }
}

impl<S: Clone> Tape<S> {
    /// Build a tape over `events`, positioned at the end.
    pub fn new(events: Vec<Event>, handlers: Arc<HandlerRegistry<S>>, initial: S) -> Self {
        let events: Arc<[Event]> = events.into();
        let position = events.len().saturating_sub(1);
        let state = fold(&handlers, &initial, &events);
        Self {
            events,
            handlers,
            initial,
            position,
            state,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// State after applying events `[0..=position]`.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// The full underlying log, read-only.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The event at the cursor, if any.
    pub fn current(&self) -> Option<&Event> {
        self.events.get(self.position)
    }

    /// Advance by one event. Saturates at the last position.
    pub fn step(&self) -> Self {
        if self.position + 1 >= self.events.len() {
            return self.clone();
        }
        let position = self.position + 1;
        let state = self
            .handlers
            .reduce(&self.events[position], self.state.clone())
            .state;
        Self {
            events: self.events.clone(),
            handlers: self.handlers.clone(),
            initial: self.initial.clone(),
            position,
            state,
        }
    }

    /// Retreat by one event. Saturates at position 0.
    pub fn step_back(&self) -> Self {
        if self.position == 0 {
            return self.clone();
        }
        self.step_to(self.position - 1)
    }

    /// Move the cursor to an absolute position (clamped to the log).
    pub fn step_to(&self, position: usize) -> Self {
        if self.events.is_empty() {
            return self.clone();
        }
        let position = position.min(self.events.len() - 1);
        if position == self.position {
            return self.clone();
        }
        let state = fold(&self.handlers, &self.initial, &self.events[..=position]);
        Self {
            events: self.events.clone(),
            handlers: self.handlers.clone(),
            initial: self.initial.clone(),
            position,
            state,
        }
    }

    /// Back to the first event.
    pub fn rewind(&self) -> Self {
        self.step_to(0)
    }

    /// State at `position` without moving the cursor.
    pub fn state_at(&self, position: usize) -> S {
        if self.events.is_empty() {
            return self.initial.clone();
        }
        let position = position.min(self.events.len() - 1);
        fold(&self.handlers, &self.initial, &self.events[..=position])
    }

    /// Advance to the last position, yielding to the scheduler between
    /// steps so observers can interleave.
    pub async fn play(&self) -> Self {
        let mut tape = self.clone();
        while tape.position + 1 < tape.events.len() {
            tape = tape.step();
            tokio::task::yield_now().await;
        }
        tape
    }
}

fn fold<S: Clone>(handlers: &HandlerRegistry<S>, initial: &S, events: &[Event]) -> S {
    events
        .iter()
        .fold(initial.clone(), |state, event| handlers.reduce(event, state).state)
}

#[cfg(test)]
#[path = "tape_tests.rs"]
mod tests;
