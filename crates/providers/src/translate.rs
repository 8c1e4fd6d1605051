// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream-to-event translation.
//!
//! These rules are the contract every adapter is held to:
//!
//! 1. Each non-empty text delta becomes one `text:delta`, in source order.
//! 2. Completion produces exactly one `text:complete` whose `full_text` is
//!    the backend's final text verbatim, or the delta concatenation when
//!    the backend returns none.
//! 3. Tool blocks become `tool:called`; tool results become `tool:result`
//!    with `is_error` reflecting the result payload.
//! 4. A successful stop maps to `end_turn`.
//! 5. Backend failures surface as [`ProviderError`]; no `text:complete` is
//!    emitted for a failed or aborted turn.

use crate::error::ProviderError;
use crate::provider::{ProviderResponse, StopReason, StreamChunk};
use reel_core::error::EventError;
use reel_core::names::{self, TextComplete, TextDelta, ToolCalled, ToolResult};
use reel_core::{Event, SessionId};
use serde_json::Value;

/// Completed translation of one provider turn.
#[derive(Debug, Clone)]
pub struct Translation {
    pub events: Vec<Event>,
    pub session_id: SessionId,
    pub text: Option<String>,
    pub output: Option<Value>,
    pub stop_reason: StopReason,
}

impl Translation {
    pub fn into_response(self) -> ProviderResponse {
        ProviderResponse {
            events: self.events,
            session_id: self.session_id,
            text: self.text,
            output: self.output,
            stop_reason: self.stop_reason,
        }
    }
}

/// Incremental chunk-to-event translator for one turn.
pub struct Translator {
    agent_name: Option<String>,
    session_id: Option<SessionId>,
    session_hint: Option<SessionId>,
    buffered_text: String,
    saw_text: bool,
    events: Vec<Event>,
    stopped: Option<Stopped>,
}

#[derive(Debug, Clone)]
struct Stopped {
    full_text: Option<String>,
    output: Option<Value>,
}

impl Translator {
    /// `session_hint` is the caller's requested session; the backend's
    /// announced session wins when both exist.
    pub fn new(agent_name: Option<String>, session_hint: Option<SessionId>) -> Self {
        Self {
            agent_name,
            session_id: None,
            session_hint,
            buffered_text: String::new(),
            saw_text: false,
            events: Vec::new(),
            stopped: None,
        }
    }

    /// Translate one chunk, returning the events it produced.
    pub fn apply(&mut self, chunk: StreamChunk) -> Result<Vec<Event>, ProviderError> {
        if self.stopped.is_some() {
            return Err(ProviderError::provider("chunk received after stop", false));
        }
        let produced = match chunk {
            StreamChunk::Init { session_id } => {
                self.session_id = Some(session_id);
                Vec::new()
            }
            StreamChunk::Text { delta } if delta.is_empty() => Vec::new(),
            StreamChunk::Text { delta } => {
                self.buffered_text.push_str(&delta);
                self.saw_text = true;
                let event = names::TEXT_DELTA
                    .create(TextDelta {
                        delta,
                        agent_name: self.agent_name.clone(),
                    })
                    .map_err(untranslatable)?;
                vec![event]
            }
            StreamChunk::ToolUse {
                tool_id,
                tool_name,
                input,
            } => {
                let event = names::TOOL_CALLED
                    .create(ToolCalled {
                        tool_name,
                        tool_id,
                        input,
                    })
                    .map_err(untranslatable)?;
                vec![event]
            }
            StreamChunk::ToolResult {
                tool_id,
                output,
                is_error,
            } => {
                let event = names::TOOL_RESULT
                    .create(ToolResult {
                        tool_id,
                        output,
                        is_error,
                    })
                    .map_err(untranslatable)?;
                vec![event]
            }
            StreamChunk::Stop {
                reason: _,
                text,
                output,
            } => {
                let full_text = text.clone().unwrap_or_else(|| self.buffered_text.clone());
                self.stopped = Some(Stopped {
                    full_text: (self.saw_text || text.is_some()).then(|| full_text.clone()),
                    output,
                });
                let event = names::TEXT_COMPLETE
                    .create(TextComplete {
                        full_text,
                        agent_name: self.agent_name.clone(),
                    })
                    .map_err(untranslatable)?;
                vec![event]
            }
        };
        self.events.extend(produced.iter().cloned());
        Ok(produced)
    }

    /// Finish the turn. The stream must have delivered a stop chunk; a
    /// stream that ends without one was truncated.
    pub fn finish(self) -> Result<Translation, ProviderError> {
        let Some(stopped) = self.stopped else {
            return Err(ProviderError::provider(
                "stream ended without a stop chunk",
                true,
            ));
        };
        let session_id = self
            .session_id
            .or(self.session_hint)
            .unwrap_or_else(SessionId::fresh);
        Ok(Translation {
            events: self.events,
            session_id,
            text: stopped.full_text,
            output: stopped.output,
            stop_reason: StopReason::EndTurn,
        })
    }
}

fn untranslatable(err: EventError) -> ProviderError {
    ProviderError::provider(err.to_string(), false)
}

#[cfg(test)]
#[path = "translate_tests.rs"]
mod tests;
