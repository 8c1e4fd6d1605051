// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::ProviderErrorCode;
use reel_core::names;
use serde_json::json;

fn hello_world_script() -> Vec<StreamChunk> {
    vec![
        StreamChunk::Init {
            session_id: SessionId::new("abc"),
        },
        StreamChunk::Text {
            delta: "Hello".into(),
        },
        StreamChunk::Text {
            delta: " World".into(),
        },
        StreamChunk::Stop {
            reason: Some("end_turn".into()),
            text: None,
            output: None,
        },
    ]
}

fn run(chunks: Vec<StreamChunk>) -> Translation {
    let mut translator = Translator::new(Some("writer".into()), None);
    for chunk in chunks {
        translator.apply(chunk).unwrap();
    }
    translator.finish().unwrap()
}

#[test]
fn deltas_then_complete_in_source_order() {
    let translation = run(hello_world_script());
    let kinds: Vec<&str> = translation.events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(kinds, vec!["text:delta", "text:delta", "text:complete"]);

    let complete = names::TEXT_COMPLETE
        .payload(&translation.events[2])
        .unwrap();
    assert_eq!(complete.full_text, "Hello World");
    assert_eq!(complete.agent_name.as_deref(), Some("writer"));

    assert_eq!(translation.session_id, SessionId::new("abc"));
    assert_eq!(translation.stop_reason, StopReason::EndTurn);
    assert_eq!(translation.text.as_deref(), Some("Hello World"));
}

#[test]
fn final_text_string_wins_verbatim() {
    let translation = run(vec![
        StreamChunk::Text {
            delta: "partial".into(),
        },
        StreamChunk::Stop {
            reason: None,
            text: Some("The Final Text".into()),
            output: None,
        },
    ]);
    let complete = names::TEXT_COMPLETE
        .payload(&translation.events[1])
        .unwrap();
    assert_eq!(complete.full_text, "The Final Text");
    assert_eq!(translation.text.as_deref(), Some("The Final Text"));
}

#[test]
fn empty_deltas_are_dropped() {
    let translation = run(vec![
        StreamChunk::Text { delta: "".into() },
        StreamChunk::Text { delta: "x".into() },
        StreamChunk::Stop {
            reason: None,
            text: None,
            output: None,
        },
    ]);
    let kinds: Vec<&str> = translation.events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(kinds, vec!["text:delta", "text:complete"]);
}

#[test]
fn tool_chunks_map_to_called_and_result() {
    let translation = run(vec![
        StreamChunk::ToolUse {
            tool_id: "t1".into(),
            tool_name: "search".into(),
            input: json!({ "query": "rust" }),
        },
        StreamChunk::ToolResult {
            tool_id: "t1".into(),
            output: json!({ "hits": 3 }),
            is_error: false,
        },
        StreamChunk::ToolResult {
            tool_id: "t2".into(),
            output: json!({ "error": "denied" }),
            is_error: true,
        },
        StreamChunk::Stop {
            reason: None,
            text: None,
            output: None,
        },
    ]);

    let called = names::TOOL_CALLED.payload(&translation.events[0]).unwrap();
    assert_eq!(called.tool_name, "search");
    assert_eq!(called.tool_id, "t1");

    let ok = names::TOOL_RESULT.payload(&translation.events[1]).unwrap();
    assert!(!ok.is_error);
    let failed = names::TOOL_RESULT.payload(&translation.events[2]).unwrap();
    assert!(failed.is_error);
}

#[test]
fn structured_output_is_carried_through() {
    let translation = run(vec![StreamChunk::Stop {
        reason: None,
        text: None,
        output: Some(json!({ "verdict": "ship" })),
    }]);
    assert_eq!(translation.output, Some(json!({ "verdict": "ship" })));
    // A turn with no text has text:complete with empty full_text but no
    // turn text.
    assert!(translation.text.is_none());
}

#[test]
fn truncated_stream_fails_without_complete() {
    let mut translator = Translator::new(None, None);
    translator
        .apply(StreamChunk::Text {
            delta: "partial".into(),
        })
        .unwrap();
    let err = translator.finish().unwrap_err();
    assert_eq!(err.code, ProviderErrorCode::Provider);
    assert!(err.retryable);
}

#[test]
fn chunk_after_stop_is_a_protocol_error() {
    let mut translator = Translator::new(None, None);
    translator
        .apply(StreamChunk::Stop {
            reason: None,
            text: None,
            output: None,
        })
        .unwrap();
    assert!(translator.apply(StreamChunk::Text { delta: "x".into() }).is_err());
}

#[test]
fn session_hint_used_when_backend_is_silent() {
    let mut translator = Translator::new(None, Some(SessionId::new("hinted")));
    translator
        .apply(StreamChunk::Stop {
            reason: None,
            text: None,
            output: None,
        })
        .unwrap();
    assert_eq!(translator.finish().unwrap().session_id, SessionId::new("hinted"));
}

#[test]
fn translation_is_deterministic_modulo_identity() {
    let first = run(hello_world_script());
    let second = run(hello_world_script());
    assert_eq!(first.events.len(), second.events.len());
    for (a, b) in first.events.iter().zip(&second.events) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.payload, b.payload);
        // id and timestamp are freshly generated per translation
        assert_ne!(a.id, b.id);
    }
}
