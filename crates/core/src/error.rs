// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core error types.
//!
//! Configuration errors (bad pattern, missing schema) surface at
//! construction time. Reducer and renderer failures are values the runtime
//! converts into in-band `error:occurred` events or log lines.

use thiserror::Error;

/// Invalid pattern text rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unsupported wildcard placement in pattern: {0:?}")]
    Unsupported(String),
}

/// Event creation or payload parsing failure.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("event name mismatch: expected {expected:?}, got {actual:?}")]
    NameMismatch {
        expected: &'static str,
        actual: String,
    },
    #[error("payload for {name:?} did not serialize: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("payload for {name:?} did not parse: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid event id: {0:?}")]
    InvalidId(String),
}

/// Failure inside a handler body.
///
/// The runtime records these as `error:occurred { kind: "handler" }` and
/// leaves state unchanged for the offending event.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Event(#[from] EventError),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Agent definition errors, thrown at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("agent {0:?} constructed without an output schema")]
    MissingOutputSchema(String),
}

impl AgentError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AgentError::MissingOutputSchema(_) => "MISSING_OUTPUT_SCHEMA",
        }
    }
}

/// Failure inside a render function; logged and swallowed by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for RenderError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for RenderError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}
