// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Abort isolation specs.
//!
//! The adapter works from a child of the caller's cancellation token: an
//! interrupted adapter task never cancels the caller's token, and a
//! cancelled stream ends without `text:complete`.

use futures_util::StreamExt;
use reel_providers::{Provider, ProviderRequest, ScriptedProvider, StreamChunk};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn stalling_provider() -> ScriptedProvider {
    ScriptedProvider::text_turn("s", &["first", "second"]).stall_after(2)
}

#[tokio::test]
async fn interrupting_the_outer_task_spares_the_caller_token() {
    let caller = CancellationToken::new();
    let provider = Arc::new(stalling_provider());

    let task_token = caller.clone();
    let task_provider = provider.clone();
    let handle = tokio::spawn(async move {
        // Blocks forever: the script stalls mid-stream.
        task_provider
            .query(ProviderRequest {
                cancel: Some(task_token),
                ..ProviderRequest::default()
            })
            .await
    });

    // Let the adapter get mid-stream, then interrupt the outer task.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    handle.abort();
    let join = handle.await;
    assert!(join.is_err() && join.unwrap_err().is_cancelled());

    // The caller owns its token's lifetime; the adapter never aborts it.
    assert!(!caller.is_cancelled());
}

#[tokio::test]
async fn caller_cancel_ends_the_stream_without_complete() {
    let caller = CancellationToken::new();
    let provider = stalling_provider();
    let mut stream = provider
        .stream(ProviderRequest {
            cancel: Some(caller.clone()),
            ..ProviderRequest::default()
        })
        .await
        .unwrap();

    // Init and the first delta arrive.
    let mut chunks = Vec::new();
    chunks.push(stream.next().await.unwrap().unwrap());
    chunks.push(stream.next().await.unwrap().unwrap());

    caller.cancel();
    let last = stream.next().await.unwrap();
    assert!(last.unwrap_err().is_abort());

    assert!(
        !chunks
            .iter()
            .any(|chunk| matches!(chunk, StreamChunk::Stop { .. })),
        "aborted stream must not deliver a stop"
    );
}

#[tokio::test]
async fn normal_completion_leaves_a_caller_token_untouched() {
    let caller = CancellationToken::new();
    let provider = ScriptedProvider::text_turn("s", &["done"]);
    provider
        .query(ProviderRequest {
            cancel: Some(caller.clone()),
            ..ProviderRequest::default()
        })
        .await
        .unwrap();
    assert!(!caller.is_cancelled());
}
