// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full-loop orchestration specs: input → agent → structured output →
//! emission → reducer → termination, with renderers observing along the
//! way.

use reel_core::test_support::event;
use reel_core::{AgentDef, Handler, HandlerResult, Pattern, PromptParts, PromptRole, RendererDef};
use reel_engine::{RunOptions, Workflow};
use reel_providers::ScriptedProvider;
use serde::Serialize;
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default, Serialize)]
struct Review {
    request: String,
    verdict: Option<String>,
    deltas_seen: u32,
}

fn reviewer_agent() -> AgentDef<Review> {
    AgentDef::builder("reviewer")
        .activates_on(Pattern::Exact("user:input".into()))
        .emits("review:verdict")
        .output_schema(json!({
            "type": "object",
            "properties": {
                "verdict": { "type": "string" },
                "confidence": { "type": "number" }
            },
            "required": ["verdict"]
        }))
        .prompt(|state: &Review, _event| {
            PromptParts::default()
                .message(PromptRole::System, "You review change requests.")
                .message(PromptRole::User, state.request.clone())
        })
        .on_output(|output, _trigger| vec![event("review:verdict", output.clone())])
        .build()
        .expect("reviewer agent")
}

#[tokio::test]
async fn a_session_flows_from_input_to_verdict() {
    let provider = Arc::new(ScriptedProvider::structured_turn(
        "review-session",
        &["Looking", " closely…"],
        json!({ "verdict": "approve", "confidence": 0.9 }),
    ));

    let rendered: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = rendered.clone();
    let renderer = RendererDef::builder("console")
        .on(Pattern::Any, move |event, _state: &Review| {
            sink.lock()
                .map_err(|_| reel_core::RenderError::new("poisoned"))?
                .push(event.name.clone());
            Ok(())
        })
        .build();

    let workflow = Workflow::<Review>::builder("review-flow")
        .initial_state(Review {
            request: "rename the config flag".into(),
            ..Review::default()
        })
        .handler(Handler::named("text:delta", "count-deltas", |_, mut state: Review| {
            state.deltas_seen += 1;
            Ok(HandlerResult::state(state))
        }))
        .handler(Handler::named(
            "review:verdict",
            "apply-verdict",
            |event, mut state: Review| {
                state.verdict = event
                    .payload
                    .get("verdict")
                    .and_then(|v| v.as_str())
                    .map(String::from);
                Ok(HandlerResult::state(state))
            },
        ))
        .renderer(renderer)
        .agent(reviewer_agent())
        .provider(provider)
        .until(|state| state.verdict.is_some())
        .build()
        .unwrap();

    let outcome = workflow.run(RunOptions::input("please review")).await.unwrap();

    assert!(outcome.terminated);
    assert_eq!(outcome.state.verdict.as_deref(), Some("approve"));
    assert_eq!(outcome.state.deltas_seen, 2);

    let names: Vec<&str> = outcome.events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "user:input",
            "agent:started",
            "text:delta",
            "text:delta",
            "text:complete",
            "agent:completed",
            "review:verdict",
        ]
    );

    // The tape over the run replays to the same state.
    assert_eq!(
        outcome.tape.state().verdict.as_deref(),
        Some("approve")
    );
    assert_eq!(outcome.tape.state_at(0).verdict, None);

    // Renderers observed the run without perturbing it; let the
    // fire-and-forget tasks settle before looking.
    for _ in 0..50 {
        tokio::task::yield_now().await;
        if rendered.lock().map(|r| r.len()).unwrap_or(0) == names.len() {
            break;
        }
    }
    let mut observed = rendered.lock().map(|r| r.clone()).unwrap_or_default();
    observed.sort();
    let mut expected: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(observed, expected);
}

#[tokio::test]
async fn agent_failures_leave_a_replayable_error_record() {
    let provider = Arc::new(ScriptedProvider::failing_with(
        vec![],
        reel_providers::ProviderError::network("dns failure"),
    ));
    let workflow = Workflow::<Review>::builder("failing-review")
        .initial_state(Review::default())
        .agent(reviewer_agent())
        .provider(provider)
        .build()
        .unwrap();

    let outcome = workflow.run(RunOptions::input("review")).await.unwrap();
    assert!(outcome.error.is_none(), "provider failure is in-band");

    let error = outcome
        .events
        .iter()
        .find(|e| e.name == "error:occurred")
        .expect("error event recorded");
    let payload = reel_core::names::ERROR_OCCURRED.payload(error).unwrap();
    assert_eq!(payload.agent_name.as_deref(), Some("reviewer"));
    assert_eq!(payload.kind, "provider");
    assert!(payload.retryable);

    // The tape over the failed session is fully usable.
    assert_eq!(outcome.tape.len(), outcome.events.len());
}
