// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted provider.
//!
//! Replays a fixed chunk sequence. This is the offline backend: workflows
//! that need deterministic provider behavior (replays, fixtures, demos)
//! run against it, and every adapter obligation can be exercised with it.

use crate::error::ProviderError;
use crate::provider::{ChunkStream, Provider, ProviderInfo, ProviderRequest, StreamChunk};
use async_trait::async_trait;
use reel_core::SessionId;
use serde_json::Value;
use std::sync::Arc;

/// A provider that replays a scripted chunk sequence.
#[derive(Clone)]
pub struct ScriptedProvider {
    name: String,
    script: Arc<Vec<Result<StreamChunk, ProviderError>>>,
    /// After yielding this many items, wait for cancellation instead of
    /// finishing. Used to exercise abort paths.
    stall_after: Option<usize>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<StreamChunk>) -> Self {
        Self {
            name: "scripted".into(),
            script: Arc::new(script.into_iter().map(Ok).collect()),
            stall_after: None,
        }
    }

    /// A script that fails with `error` after yielding `script`.
    pub fn failing_with(script: Vec<StreamChunk>, error: ProviderError) -> Self {
        let mut items: Vec<Result<StreamChunk, ProviderError>> =
            script.into_iter().map(Ok).collect();
        items.push(Err(error));
        Self {
            name: "scripted".into(),
            script: Arc::new(items),
            stall_after: None,
        }
    }

    /// Convenience: an init, the given deltas, and a clean stop.
    pub fn text_turn(session_id: impl Into<SessionId>, deltas: &[&str]) -> Self {
        let mut script = vec![StreamChunk::Init {
            session_id: session_id.into(),
        }];
        script.extend(deltas.iter().map(|delta| StreamChunk::Text {
            delta: (*delta).to_string(),
        }));
        script.push(StreamChunk::Stop {
            reason: Some("end_turn".into()),
            text: None,
            output: None,
        });
        Self::new(script)
    }

    /// Convenience: a text turn that also yields structured output.
    pub fn structured_turn(
        session_id: impl Into<SessionId>,
        deltas: &[&str],
        output: Value,
    ) -> Self {
        let mut provider = Self::text_turn(session_id, deltas);
        let mut script: Vec<Result<StreamChunk, ProviderError>> =
            provider.script.as_ref().clone();
        if let Some(Ok(StreamChunk::Stop {
            output: stop_output,
            ..
        })) = script.last_mut()
        {
            *stop_output = Some(output);
        }
        provider.script = Arc::new(script);
        provider
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Stall (awaiting cancellation) after yielding `n` items.
    pub fn stall_after(mut self, n: usize) -> Self {
        self.stall_after = Some(n);
        self
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn stream(&self, request: ProviderRequest) -> Result<ChunkStream, ProviderError> {
        // The adapter works from a child of the caller's token; the
        // caller's token itself is never cancelled from here.
        let cancel = request.cancel.clone().unwrap_or_default();
        let internal = cancel.child_token();
        let script = self.script.clone();
        let stall_after = self.stall_after;

        let stream = async_stream::stream! {
            for (index, item) in script.iter().enumerate() {
                if stall_after == Some(index) {
                    internal.cancelled().await;
                    yield Err(ProviderError::aborted());
                    return;
                }
                if internal.is_cancelled() {
                    yield Err(ProviderError::aborted());
                    return;
                }
                yield item.clone();
                tokio::task::yield_now().await;
            }
            if let Some(n) = stall_after {
                if n >= script.len() {
                    internal.cancelled().await;
                    yield Err(ProviderError::aborted());
                }
            }
        };
        Ok(Box::pin(stream))
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            kind: "scripted".into(),
            name: self.name.clone(),
            model: None,
            connected: true,
        }
    }
}

#[cfg(test)]
#[path = "scripted_tests.rs"]
mod tests;
