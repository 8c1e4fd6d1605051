// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reel-engine: the workflow runtime.
//!
//! Wires the pieces together: a [`HandlerRegistry`] reduces events, an
//! [`AgentRegistry`] activates declarative agents against a streaming
//! provider, renderers observe, the [`EventBus`] gives external callers a
//! serialized way in, and a [`Tape`] replays any prefix of the persisted
//! log deterministically.

mod agents;
mod bus;
mod error;
mod handlers;
mod renderers;
mod tape;
mod workflow;

pub use agents::AgentRegistry;
pub use bus::EventBus;
pub use error::{
    AgentRegistryError, EventBusError, HandlerRegistryError, RendererRegistryError, RuntimeError,
};
pub use handlers::{HandlerRegistry, Reduction};
pub use renderers::RendererSet;
pub use tape::Tape;
pub use workflow::{
    RunFailure, RunOptions, RunOutcome, Workflow, WorkflowBuilder, WorkflowState,
};
