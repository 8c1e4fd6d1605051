// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reel-core: event model, patterns, and reducer definitions for the reel runtime

pub mod macros;

pub mod agent;
pub mod causality;
pub mod clock;
pub mod error;
pub mod event;
pub mod handler;
pub mod names;
pub mod pattern;
pub mod renderer;
pub mod session;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{AgentBuilder, AgentDef, PromptMessage, PromptParts, PromptRole};
pub use causality::{verify_causality, CausalityError, Lineage};
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{AgentError, EventError, HandlerError, PatternError, RenderError};
pub use event::{Event, EventDef, EventId};
pub use handler::{Handler, HandlerResult};
pub use pattern::{find_matching, Pattern};
pub use renderer::{RendererBuilder, RendererDef};
pub use session::SessionId;
