// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider failure taxonomy.

use thiserror::Error;

/// Stable provider error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorCode {
    Provider,
    Aborted,
    Network,
}

reel_core::simple_display! {
    ProviderErrorCode {
        Provider => "PROVIDER_ERROR",
        Aborted => "ABORTED",
        Network => "NETWORK_ERROR",
    }
}

/// A provider failure with a stable code and a retry hint.
///
/// `retryable` indicates whether repeating the same request may succeed
/// (rate limits, transient network faults). Aborts are never retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: ProviderErrorCode,
    pub message: String,
    pub retryable: bool,
}

impl ProviderError {
    pub fn provider(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            code: ProviderErrorCode::Provider,
            message: message.into(),
            retryable,
        }
    }

    pub fn aborted() -> Self {
        Self {
            code: ProviderErrorCode::Aborted,
            message: "stream aborted".into(),
            retryable: false,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            code: ProviderErrorCode::Network,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn is_abort(&self) -> bool {
        self.code == ProviderErrorCode::Aborted
    }
}
