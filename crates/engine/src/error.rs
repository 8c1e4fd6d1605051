// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types.

use reel_storage::StoreError;
use thiserror::Error;

/// Duplicate registrations caught at workflow construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerRegistryError {
    #[error("duplicate handler for event {0:?}")]
    DuplicateEvent(String),
    #[error("duplicate catch-all handler (already have {0:?})")]
    DuplicateCatchAll(String),
    #[error("duplicate handler name {0:?}")]
    DuplicateName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentRegistryError {
    #[error("duplicate agent name {0:?}")]
    DuplicateName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RendererRegistryError {
    #[error("duplicate renderer name {0:?}")]
    DuplicateName(String),
}

/// Emission into a run that is no longer draining its queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventBusError {
    #[error("emit failed: the event loop is gone")]
    EmitFailed,
}

impl EventBusError {
    pub fn code(&self) -> &'static str {
        match self {
            EventBusError::EmitFailed => "EMIT_FAILED",
        }
    }
}

/// Runtime failures that reject the `run` future.
///
/// In-band failures (provider errors, handler errors) never appear here;
/// they are recorded as `error:occurred` events. Only store-append
/// failures and configuration/invariant violations reject the run.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    #[error("invalid workflow configuration: {0}")]
    Config(String),
    #[error("workflow configured with agents but no provider")]
    MissingProvider,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    HandlerRegistry(#[from] HandlerRegistryError),
    #[error(transparent)]
    AgentRegistry(#[from] AgentRegistryError),
    #[error(transparent)]
    RendererRegistry(#[from] RendererRegistryError),
}

impl RuntimeError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::ExecutionFailed(_) => "EXECUTION_FAILED",
            RuntimeError::Config(_) | RuntimeError::MissingProvider => "INVALID_CONFIG",
            RuntimeError::Store(_) => "STORE_FAILED",
            RuntimeError::HandlerRegistry(_)
            | RuntimeError::AgentRegistry(_)
            | RuntimeError::RendererRegistry(_) => "DUPLICATE_REGISTRATION",
        }
    }
}
