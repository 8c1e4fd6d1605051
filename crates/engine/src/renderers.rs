// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Renderer fan-out.
//!
//! Renderers are observers; nothing they do can reach the reducer. Sync
//! fan-out runs in registration order for callers that need ordering;
//! async fan-out spawns one task per matching renderer and gives no
//! intra-event ordering guarantee.

use crate::error::RendererRegistryError;
use reel_core::{Event, RendererDef};
use std::collections::HashSet;
use std::sync::Arc;

/// The renderer registry, in registration order.
#[derive(Debug)]
pub struct RendererSet<S> {
    renderers: Vec<Arc<RendererDef<S>>>,
}

impl<S> Clone for RendererSet<S> {
    fn clone(&self) -> Self {
        Self {
            renderers: self.renderers.clone(),
        }
    }
}

impl<S> Default for RendererSet<S> {
    fn default() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }
}

impl<S> RendererSet<S> {
    pub fn from_defs(
        defs: impl IntoIterator<Item = RendererDef<S>>,
    ) -> Result<Self, RendererRegistryError> {
        let mut names = HashSet::new();
        let mut renderers = Vec::new();
        for def in defs {
            if !names.insert(def.name().to_string()) {
                return Err(RendererRegistryError::DuplicateName(def.name().to_string()));
            }
            renderers.push(Arc::new(def));
        }
        Ok(Self { renderers })
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    /// Render synchronously, in registration order. Failures are logged
    /// and swallowed; they never propagate.
    pub fn render_event(&self, event: &Event, state: &S) {
        for renderer in &self.renderers {
            if !renderer.matches(&event.name) {
                continue;
            }
            if let Err(err) = renderer.render(event, state) {
                tracing::warn!(
                    renderer = renderer.name(),
                    event = %event.log_summary(),
                    error = %err,
                    "renderer failed"
                );
            }
        }
    }
}

impl<S: Clone + Send + Sync + 'static> RendererSet<S> {
    /// Fire-and-forget fan-out: one task per matching renderer.
    ///
    /// Intra-event ordering across renderers is unspecified. The caller
    /// must not await renderers inside the reducer.
    pub fn render_event_async(&self, event: &Event, state: &S) {
        for renderer in &self.renderers {
            if !renderer.matches(&event.name) {
                continue;
            }
            let renderer = renderer.clone();
            let event = event.clone();
            let state = state.clone();
            tokio::spawn(async move {
                if let Err(err) = renderer.render(&event, &state) {
                    tracing::warn!(
                        renderer = renderer.name(),
                        event = %event.log_summary(),
                        error = %err,
                        "renderer failed"
                    );
                }
            });
        }
    }
}

#[cfg(test)]
#[path = "renderers_tests.rs"]
mod tests;
