// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core event vocabulary shared by the runtime, providers, and agents.
//!
//! These are the events the runtime itself creates: the seed input, agent
//! lifecycle markers, streamed provider output, tool activity, and in-band
//! failures. Workflow authors add their own `domain:action` names next to
//! these.

use crate::event::EventDef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const USER_INPUT: EventDef<UserInput> = EventDef::new("user:input");
pub const AGENT_STARTED: EventDef<AgentStarted> = EventDef::new("agent:started");
pub const AGENT_COMPLETED: EventDef<AgentCompleted> = EventDef::new("agent:completed");
pub const TEXT_DELTA: EventDef<TextDelta> = EventDef::new("text:delta");
pub const TEXT_COMPLETE: EventDef<TextComplete> = EventDef::new("text:complete");
pub const TOOL_CALLED: EventDef<ToolCalled> = EventDef::new("tool:called");
pub const TOOL_RESULT: EventDef<ToolResult> = EventDef::new("tool:result");
pub const ERROR_OCCURRED: EventDef<ErrorOccurred> = EventDef::new("error:occurred");

/// Seed event of every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    pub text: String,
}

/// An agent's provider call began.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStarted {
    pub agent_name: String,
}

/// An agent's provider call finished with validated structured output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCompleted {
    pub agent_name: String,
    pub output: Value,
}

/// One streamed text fragment, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDelta {
    pub delta: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
}

/// End of a streamed turn; `full_text` is the whole turn's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextComplete {
    pub full_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
}

/// The provider invoked a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCalled {
    pub tool_name: String,
    pub tool_id: String,
    pub input: Value,
}

/// Result of a tool invocation, keyed by `tool_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_id: String,
    pub output: Value,
    pub is_error: bool,
}

/// In-band failure record; replayable like any other event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorOccurred {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub kind: String,
    pub message: String,
    pub retryable: bool,
}
