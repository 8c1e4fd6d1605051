// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Causality specs: `caused_by` forms a DAG rooted at external input.

use reel_core::test_support::event;
use reel_core::{Handler, HandlerResult, Pattern};
use reel_engine::{RunOptions, Workflow};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize)]
struct Trail {
    seen: Vec<String>,
}

#[tokio::test]
async fn handler_emissions_chain_back_to_the_input() {
    let workflow = Workflow::<Trail>::builder("causality-chain")
        .initial_state(Trail::default())
        .handler(Handler::named("user:input", "start", |_, mut state: Trail| {
            state.seen.push("input".into());
            Ok(HandlerResult::with_events(
                state,
                vec![event("step:1", json!({ "from": "input" }))],
            ))
        }))
        .handler(Handler::named("step:1", "step-one", |_, mut state: Trail| {
            state.seen.push("step:1".into());
            Ok(HandlerResult::with_events(
                state,
                vec![event("step:2", json!({ "from": "step1" }))],
            ))
        }))
        .handler(Handler::named("step:2", "step-two", |_, mut state: Trail| {
            state.seen.push("step:2".into());
            Ok(HandlerResult::state(state))
        }))
        .build()
        .unwrap();

    let outcome = workflow.run(RunOptions::input("start")).await.unwrap();

    assert_eq!(outcome.events.len(), 3);
    assert_eq!(outcome.events[1].caused_by, Some(outcome.events[0].id));
    assert_eq!(outcome.events[2].caused_by, Some(outcome.events[1].id));
}

#[tokio::test]
async fn every_caused_by_references_an_earlier_event_in_the_session() {
    let provider = Arc::new(reel_providers::ScriptedProvider::structured_turn(
        "s",
        &["a", "b"],
        json!({ "ok": true }),
    ));
    let agent = reel_core::AgentDef::<Trail>::builder("echo")
        .activates_on(Pattern::Exact("user:input".into()))
        .output_schema(json!({ "type": "object" }))
        .on_output(|output, _| vec![event("echo:done", output.clone())])
        .build()
        .unwrap();

    let workflow = Workflow::<Trail>::builder("causality-dag")
        .initial_state(Trail::default())
        .agent(agent)
        .provider(provider)
        .build()
        .unwrap();

    let outcome = workflow.run(RunOptions::input("go")).await.unwrap();
    assert!(outcome.events.len() > 3);

    reel_core::verify_causality(&outcome.events).unwrap();

    // The whole session hangs off the external input.
    let lineage = reel_core::Lineage::new(&outcome.events);
    let roots: Vec<_> = lineage.roots().iter().map(|e| e.id).collect();
    assert_eq!(roots, vec![outcome.events[0].id]);
    for event in &outcome.events[1..] {
        assert_eq!(
            lineage.root_of(event.id).map(|e| e.id),
            Some(outcome.events[0].id)
        );
    }
}
