// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Renderer definitions.
//!
//! A renderer is a pure observer: it sees `(event, state)` by reference,
//! may produce external side-effects (print, speak, push to a socket), and
//! can neither mutate state nor emit events. Render failures are reported
//! to the caller, which logs and swallows them; they never reach the
//! reducer.

use crate::error::RenderError;
use crate::event::Event;
use crate::pattern::Pattern;
use std::fmt;

pub type RenderFn<S> = dyn Fn(&Event, &S) -> Result<(), RenderError> + Send + Sync;

/// A named observer routing matching events to render functions.
pub struct RendererDef<S> {
    name: String,
    routes: Vec<(Pattern, Box<RenderFn<S>>)>,
}

impl<S> RendererDef<S> {
    pub fn builder(name: impl Into<String>) -> RendererBuilder<S> {
        RendererBuilder {
            name: name.into(),
            routes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.routes.iter().map(|(pattern, _)| pattern)
    }

    /// True when any route matches `event_name`.
    pub fn matches(&self, event_name: &str) -> bool {
        self.routes
            .iter()
            .any(|(pattern, _)| pattern.matches(event_name))
    }

    /// Run every route whose pattern matches the event.
    ///
    /// All matching routes run even if an earlier one fails; the first
    /// failure is returned.
    pub fn render(&self, event: &Event, state: &S) -> Result<(), RenderError> {
        let mut first_err = None;
        for (pattern, render) in &self.routes {
            if pattern.matches(&event.name) {
                if let Err(err) = render(event, state) {
                    first_err.get_or_insert(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<S> fmt::Debug for RendererDef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererDef")
            .field("name", &self.name)
            .field(
                "patterns",
                &self.patterns().map(|p| p.to_string()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Builder mapping patterns to render functions, in registration order.
pub struct RendererBuilder<S> {
    name: String,
    routes: Vec<(Pattern, Box<RenderFn<S>>)>,
}

impl<S> RendererBuilder<S> {
    pub fn on<F>(mut self, pattern: Pattern, render: F) -> Self
    where
        F: Fn(&Event, &S) -> Result<(), RenderError> + Send + Sync + 'static,
    {
        self.routes.push((pattern, Box::new(render)));
        self
    }

    pub fn build(self) -> RendererDef<S> {
        RendererDef {
            name: self.name,
            routes: self.routes,
        }
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
