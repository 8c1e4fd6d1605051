// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP + SSE streaming provider.
//!
//! Speaks the messages-over-SSE wire protocol: a POST whose response body
//! is a Server-Sent-Events stream of `event:`/`data:` line pairs. Wire
//! events are assembled into [`StreamChunk`]s; tool-use input arrives as
//! partial JSON fragments and is buffered until the block closes.

use crate::error::ProviderError;
use crate::provider::{ChunkStream, Provider, ProviderInfo, ProviderRequest, StreamChunk};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reel_core::SessionId;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Streaming SSE backend.
#[derive(Clone)]
pub struct SseProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    name: String,
}

impl SseProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
            model: "default".into(),
            name: "sse".into(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn build_body(&self, request: &ProviderRequest) -> Value {
        let config = &request.config;
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({ "role": m.role.to_string(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": config.model.clone().unwrap_or_else(|| self.model.clone()),
            "messages": messages,
            "stream": true,
        });
        if let Some(map) = body.as_object_mut() {
            if let Some(max_turns) = config.max_turns {
                map.insert("max_turns".into(), json!(max_turns));
            }
            if let Some(mode) = config.permission_mode {
                map.insert("permission_mode".into(), json!(mode));
            }
            if let Some(format) = &config.output_format {
                map.insert("output_format".into(), json!(format));
            }
            if let Some(resume) = config
                .resume
                .as_ref()
                .or(request.session_id.as_ref())
            {
                map.insert("session_id".into(), json!(resume.as_str()));
            }
            // Unknown config keys pass through untouched.
            for (key, value) in &config.extra {
                map.insert(key.clone(), value.clone());
            }
        }
        body
    }
}

#[async_trait]
impl Provider for SseProvider {
    async fn stream(&self, request: ProviderRequest) -> Result<ChunkStream, ProviderError> {
        // The adapter only ever cancels a child of the caller's token.
        let cancel = request.cancel.clone().unwrap_or_default();
        let internal = cancel.child_token();

        let body = self.build_body(&request);
        let mut http = self
            .client
            .post(&self.endpoint)
            .header("accept", "text/event-stream")
            .json(&body);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = tokio::select! {
            _ = internal.cancelled() => return Err(ProviderError::aborted()),
            sent = http.send() => sent.map_err(|err| ProviderError::network(err.to_string()))?,
        };

        let status = response.status();
        if !status.is_success() {
            let retryable = status.is_server_error() || status.as_u16() == 429;
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::provider(
                format!("HTTP {status}: {detail}"),
                retryable,
            ));
        }

        tracing::debug!(endpoint = %self.endpoint, "sse stream opened");
        Ok(parse_sse_stream(response.bytes_stream(), internal))
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            kind: "sse".into(),
            name: self.name.clone(),
            model: Some(self.model.clone()),
            connected: true,
        }
    }
}

/// Parse a raw byte stream of SSE lines into stream chunks.
///
/// Partial lines are buffered across byte chunks; a blank line dispatches
/// the accumulated `event:`/`data:` pair.
fn parse_sse_stream(
    byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
    internal: CancellationToken,
) -> ChunkStream {
    Box::pin(async_stream::stream! {
        let mut state = SseParserState::new();
        let mut bytes_stream = std::pin::pin!(byte_stream);
        let mut line_buf = String::new();

        loop {
            let chunk = tokio::select! {
                _ = internal.cancelled() => {
                    yield Err(ProviderError::aborted());
                    return;
                }
                next = bytes_stream.next() => match next {
                    None => break,
                    Some(Ok(bytes)) => bytes,
                    Some(Err(err)) => {
                        yield Err(ProviderError::network(format!("stream read error: {err}")));
                        return;
                    }
                },
            };

            let text = match std::str::from_utf8(&chunk) {
                Ok(text) => text,
                Err(err) => {
                    yield Err(ProviderError::provider(format!("UTF-8 decode error: {err}"), false));
                    return;
                }
            };

            line_buf.push_str(text);
            while let Some(newline) = line_buf.find('\n') {
                let line = line_buf[..newline].trim_end_matches('\r').to_string();
                line_buf.drain(..=newline);
                for item in state.process_line(&line) {
                    let failed = item.is_err();
                    yield item;
                    if failed {
                        return;
                    }
                }
            }
        }

        // A final unterminated line still dispatches.
        if !line_buf.trim().is_empty() {
            let line = line_buf.trim().to_string();
            for item in state.process_line(&line) {
                yield item;
            }
        }
        for item in state.process_line("") {
            yield item;
        }
    })
}

type ChunkItems = Vec<Result<StreamChunk, ProviderError>>;

/// Tracks in-progress streaming state across SSE events.
struct SseParserState {
    /// The current SSE event type (from `event:` lines).
    event_type: Option<String>,
    /// The current SSE data (from `data:` lines; may be multi-line).
    data: String,
    /// Block index → in-progress tool use.
    tools: HashMap<u64, ToolUseInProgress>,
    stop_reason: Option<String>,
}

struct ToolUseInProgress {
    id: String,
    name: String,
    input_buf: String,
}

impl SseParserState {
    fn new() -> Self {
        Self {
            event_type: None,
            data: String::new(),
            tools: HashMap::new(),
            stop_reason: None,
        }
    }

    /// Feed one SSE line. A blank line terminates the pending event and
    /// may produce chunks.
    fn process_line(&mut self, line: &str) -> ChunkItems {
        if line.is_empty() {
            return self.dispatch();
        }
        if let Some(rest) = line.strip_prefix("event:") {
            self.event_type = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            if !self.data.is_empty() {
                self.data.push('\n');
            }
            self.data.push_str(rest.trim_start());
        }
        // Comment lines (leading ':') and unknown fields are ignored.
        Vec::new()
    }

    fn dispatch(&mut self) -> ChunkItems {
        let event_type = self.event_type.take();
        let data = std::mem::take(&mut self.data);
        if data.is_empty() {
            return Vec::new();
        }
        let value: Value = match serde_json::from_str(&data) {
            Ok(value) => value,
            Err(err) => {
                return vec![Err(ProviderError::provider(
                    format!("malformed SSE data: {err}"),
                    false,
                ))]
            }
        };
        let kind = event_type
            .or_else(|| value.get("type").and_then(Value::as_str).map(String::from))
            .unwrap_or_default();

        match kind.as_str() {
            "message_start" => {
                let session_id = value
                    .pointer("/message/id")
                    .and_then(Value::as_str)
                    .map(SessionId::new);
                match session_id {
                    Some(session_id) => vec![Ok(StreamChunk::Init { session_id })],
                    None => Vec::new(),
                }
            }
            "content_block_start" => {
                if value.pointer("/content_block/type").and_then(Value::as_str)
                    == Some("tool_use")
                {
                    let index = value.get("index").and_then(Value::as_u64).unwrap_or(0);
                    let id = value
                        .pointer("/content_block/id")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    let name = value
                        .pointer("/content_block/name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    self.tools.insert(
                        index,
                        ToolUseInProgress {
                            id,
                            name,
                            input_buf: String::new(),
                        },
                    );
                }
                Vec::new()
            }
            "content_block_delta" => {
                match value.pointer("/delta/type").and_then(Value::as_str) {
                    Some("text_delta") => {
                        let delta = value
                            .pointer("/delta/text")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string();
                        vec![Ok(StreamChunk::Text { delta })]
                    }
                    Some("input_json_delta") => {
                        let index = value.get("index").and_then(Value::as_u64).unwrap_or(0);
                        if let Some(tool) = self.tools.get_mut(&index) {
                            if let Some(partial) =
                                value.pointer("/delta/partial_json").and_then(Value::as_str)
                            {
                                tool.input_buf.push_str(partial);
                            }
                        }
                        Vec::new()
                    }
                    _ => Vec::new(),
                }
            }
            "content_block_stop" => {
                let index = value.get("index").and_then(Value::as_u64).unwrap_or(0);
                let Some(tool) = self.tools.remove(&index) else {
                    return Vec::new();
                };
                let input = if tool.input_buf.is_empty() {
                    json!({})
                } else {
                    match serde_json::from_str(&tool.input_buf) {
                        Ok(input) => input,
                        Err(err) => {
                            return vec![Err(ProviderError::provider(
                                format!("malformed tool input for {}: {err}", tool.name),
                                false,
                            ))]
                        }
                    }
                };
                vec![Ok(StreamChunk::ToolUse {
                    tool_id: tool.id,
                    tool_name: tool.name,
                    input,
                })]
            }
            "message_delta" => {
                if let Some(reason) =
                    value.pointer("/delta/stop_reason").and_then(Value::as_str)
                {
                    self.stop_reason = Some(reason.to_string());
                }
                Vec::new()
            }
            "message_stop" => vec![Ok(StreamChunk::Stop {
                reason: self.stop_reason.take(),
                text: None,
                output: None,
            })],
            "error" => {
                let message = value
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .unwrap_or("provider error")
                    .to_string();
                let error_type = value
                    .pointer("/error/type")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let retryable =
                    matches!(error_type, "overloaded_error" | "rate_limit_error" | "api_error");
                vec![Err(ProviderError::provider(message, retryable))]
            }
            // Keep-alives and unknown event kinds are skipped.
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
