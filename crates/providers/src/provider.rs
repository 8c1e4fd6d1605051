// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The provider seam: request/response types and the trait.

use crate::error::ProviderError;
use crate::translate::Translator;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reel_core::agent::PromptMessage;
use reel_core::{Event, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// Permission posture forwarded to backends that understand it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    BypassPermissions,
    AskUser,
    AcceptEdits,
}

/// Structured-output request attached to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputFormat {
    JsonSchema { schema: Value },
}

/// Adapter configuration. Unknown keys pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_mode: Option<PermissionMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    /// Client-side turn deadline. On expiry the invocation's token fires
    /// and the turn fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Resume an earlier provider session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<SessionId>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One provider invocation.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    pub messages: Vec<PromptMessage>,
    pub config: ProviderConfig,
    pub session_id: Option<SessionId>,
    /// Stamped into translated events' payloads.
    pub agent_name: Option<String>,
    /// Caller-owned cancellation. The adapter derives a child token from
    /// it and never cancels the caller's token itself.
    pub cancel: Option<CancellationToken>,
}

impl ProviderRequest {
    pub fn from_messages(messages: Vec<PromptMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }
}

/// Why a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    Other(String),
}

reel_core::simple_display! {
    StopReason {
        EndTurn => "end_turn",
        Other(..) => "other",
    }
}

/// Final result of a translated provider turn.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Core events in emission order.
    pub events: Vec<Event>,
    pub session_id: SessionId,
    /// The turn's full text, when any text streamed.
    pub text: Option<String>,
    /// Structured output, when the backend produced one.
    pub output: Option<Value>,
    pub stop_reason: StopReason,
}

/// One unit of a provider's native stream, already normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// Backend announced the session it is serving.
    Init { session_id: SessionId },
    /// A text fragment, in source order.
    Text { delta: String },
    /// A tool invocation block.
    ToolUse {
        tool_id: String,
        tool_name: String,
        input: Value,
    },
    /// A tool result keyed by `tool_id`.
    ToolResult {
        tool_id: String,
        output: Value,
        is_error: bool,
    },
    /// Successful end of the turn.
    Stop {
        reason: Option<String>,
        /// Final text returned verbatim by the backend, when it has one.
        text: Option<String>,
        /// Structured output, when the backend produced one.
        output: Option<Value>,
    },
}

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ProviderError>> + Send>>;

/// Descriptive adapter metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub connected: bool,
}

/// A streaming LLM backend.
///
/// Adapters are value objects; the runtime never inspects their internals.
/// The stream is finite, lazy, and non-restartable.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Open the native stream for one request.
    async fn stream(&self, request: ProviderRequest) -> Result<ChunkStream, ProviderError>;

    fn info(&self) -> ProviderInfo;

    /// Drive `stream` through the translator and collect the turn.
    async fn query(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let agent_name = request.agent_name.clone();
        let session_hint = request.session_id.clone();
        let mut stream = self.stream(request).await?;
        let mut translator = Translator::new(agent_name, session_hint);
        while let Some(chunk) = stream.next().await {
            translator.apply(chunk?)?;
        }
        let translation = translator.finish()?;
        Ok(translation.into_response())
    }
}
