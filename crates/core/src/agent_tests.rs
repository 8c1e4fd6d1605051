// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::AgentError;
use serde_json::json;

fn schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": { "verdict": { "type": "string" } },
        "required": ["verdict"]
    })
}

#[test]
fn build_without_schema_fails_synchronously() {
    let err = AgentDef::<()>::builder("judge").build().unwrap_err();
    assert_eq!(err, AgentError::MissingOutputSchema("judge".into()));
    assert_eq!(err.code(), "MISSING_OUTPUT_SCHEMA");
}

#[test]
fn build_with_schema_succeeds() {
    let agent = AgentDef::<()>::builder("judge")
        .output_schema(schema())
        .build()
        .unwrap();
    assert_eq!(agent.name(), "judge");
    assert_eq!(agent.output_schema(), &schema());
}

#[test]
fn activates_for_any_pattern() {
    let agent = AgentDef::<()>::builder("judge")
        .activates_on(Pattern::parse("user:input").unwrap())
        .activates_on(Pattern::parse("step:*").unwrap())
        .output_schema(schema())
        .build()
        .unwrap();
    assert!(agent.activates_for("user:input"));
    assert!(agent.activates_for("step:started"));
    assert!(!agent.activates_for("text:delta"));
}

#[test]
fn guard_defaults_to_true() {
    let agent = AgentDef::<u32>::builder("judge")
        .output_schema(schema())
        .build()
        .unwrap();
    assert!(agent.permits(&0));
}

#[test]
fn guard_gates_activation() {
    let agent = AgentDef::<u32>::builder("judge")
        .when(|count| *count > 2)
        .output_schema(schema())
        .build()
        .unwrap();
    assert!(!agent.permits(&1));
    assert!(agent.permits(&3));
}

#[test]
fn default_prompt_is_the_event_payload() {
    let agent = AgentDef::<()>::builder("judge")
        .output_schema(schema())
        .build()
        .unwrap();
    let event = Event::new("user:input", json!({ "text": "hello" }));
    let prompt = agent.prompt(&(), &event);
    assert_eq!(prompt.messages.len(), 1);
    assert_eq!(prompt.messages[0].role, PromptRole::User);
    assert!(prompt.messages[0].content.contains("hello"));
}

#[test]
fn custom_prompt_sees_state_and_event() {
    let agent = AgentDef::<String>::builder("judge")
        .prompt(|state, event| {
            PromptParts::default()
                .message(PromptRole::System, state.clone())
                .message(PromptRole::User, event.name.clone())
        })
        .output_schema(schema())
        .build()
        .unwrap();
    let event = Event::new("user:input", json!({}));
    let prompt = agent.prompt(&"context".to_string(), &event);
    assert_eq!(prompt.messages[0].content, "context");
    assert_eq!(prompt.messages[1].content, "user:input");
}

#[test]
fn default_on_output_emits_nothing() {
    let agent = AgentDef::<()>::builder("judge")
        .output_schema(schema())
        .build()
        .unwrap();
    let trigger = Event::new("user:input", json!({}));
    assert!(agent.map_output(&json!({ "verdict": "ok" }), &trigger).is_empty());
}

#[test]
fn on_output_maps_to_events() {
    let agent = AgentDef::<()>::builder("judge")
        .emits("verdict:ready")
        .output_schema(schema())
        .on_output(|output, trigger| {
            vec![Event::new("verdict:ready", output.clone()).caused_by(trigger.id)]
        })
        .build()
        .unwrap();
    let trigger = Event::new("user:input", json!({}));
    let emitted = agent.map_output(&json!({ "verdict": "ok" }), &trigger);
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].name, "verdict:ready");
    assert_eq!(emitted[0].caused_by, Some(trigger.id));
    assert_eq!(agent.emits(), &["verdict:ready".to_string()]);
}
