// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process event bus.
//!
//! There is exactly one dispatch per event: the bus reduces it through the
//! handler registry, selects activating agents, and fans out to renderers.
//! `emit` is the only door for code outside the run loop; it serializes
//! events onto the same queue the loop drains.

use crate::agents::AgentRegistry;
use crate::error::EventBusError;
use crate::handlers::{HandlerRegistry, Reduction};
use crate::renderers::RendererSet;
use reel_core::{AgentDef, Event};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Dispatcher around the handler, agent, and renderer registries.
pub struct EventBus<S> {
    handlers: Arc<HandlerRegistry<S>>,
    agents: AgentRegistry<S>,
    renderers: RendererSet<S>,
    emit_tx: mpsc::UnboundedSender<Event>,
}

impl<S> Clone for EventBus<S> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
            agents: self.agents.clone(),
            renderers: self.renderers.clone(),
            emit_tx: self.emit_tx.clone(),
        }
    }
}

impl<S> EventBus<S> {
    /// Create a bus plus the receiver its queue drains from.
    pub fn channel(
        handlers: Arc<HandlerRegistry<S>>,
        agents: AgentRegistry<S>,
        renderers: RendererSet<S>,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (emit_tx, emit_rx) = mpsc::unbounded_channel();
        (
            Self {
                handlers,
                agents,
                renderers,
                emit_tx,
            },
            emit_rx,
        )
    }

    /// Serialize an external event onto the run queue.
    pub fn emit(&self, event: Event) -> Result<(), EventBusError> {
        self.emit_tx
            .send(event)
            .map_err(|_| EventBusError::EmitFailed)
    }

    /// Agents this event activates under `state`, in registration order.
    pub fn matching_agents(&self, event: &Event, state: &S) -> Vec<Arc<AgentDef<S>>> {
        self.agents.matching(&event.name, state)
    }
}

impl<S: Clone> EventBus<S> {
    /// Reduce one event through the handler registry.
    pub fn reduce(&self, event: &Event, state: S) -> Reduction<S> {
        self.handlers.reduce(event, state)
    }

    /// Synchronous renderer fan-out, registration order.
    pub fn render(&self, event: &Event, state: &S) {
        self.renderers.render_event(event, state);
    }
}

impl<S: Clone + Send + Sync + 'static> EventBus<S> {
    /// Fire-and-forget renderer fan-out.
    pub fn render_async(&self, event: &Event, state: &S) {
        self.renderers.render_event_async(event, state);
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
