// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reel-providers: streaming LLM backends translated into core events.
//!
//! A [`Provider`] encapsulates one backend. Its `stream` yields
//! [`StreamChunk`]s; the [`translate::Translator`] turns chunks into the
//! core event vocabulary (`text:delta`, `text:complete`, `tool:called`,
//! `tool:result`) under the ordering obligations the runtime replays
//! against. `query` drives stream + translator to completion.

mod error;
mod provider;
mod scripted;
mod sse;
pub mod translate;

pub use error::{ProviderError, ProviderErrorCode};
pub use provider::{
    ChunkStream, OutputFormat, PermissionMode, Provider, ProviderConfig, ProviderInfo,
    ProviderRequest, ProviderResponse, StopReason, StreamChunk,
};
pub use scripted::ScriptedProvider;
pub use sse::SseProvider;
pub use translate::{Translation, Translator};
