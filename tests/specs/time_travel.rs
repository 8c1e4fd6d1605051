// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tape time-travel specs.

use crate::prelude::arithmetic_tape;
use reel_core::test_support::{event, MathOperand, MATH_ADD};
use reel_engine::{HandlerRegistry, Tape};
use serde_json::json;
use std::sync::Arc;

fn five_event_tape() -> Tape<reel_core::test_support::Arith> {
    let handlers = Arc::new(
        HandlerRegistry::from_handlers(reel_core::test_support::arithmetic_handlers()).unwrap(),
    );
    let events = (1..=5)
        .map(|value| MATH_ADD.create(MathOperand { value }).unwrap())
        .collect();
    Tape::new(events, handlers, Default::default())
}

#[test]
fn step_forward_then_back_is_identity_over_five_events() {
    let tape = five_event_tape();
    assert_eq!(
        tape.step_to(3).step().step_back().state(),
        &tape.state_at(3)
    );
}

#[test]
fn step_to_then_back_matches_the_previous_position() {
    let tape = arithmetic_tape();
    for n in 1..tape.len() {
        assert_eq!(
            tape.step_to(n).step_back().state(),
            &tape.state_at(n - 1),
            "round trip at position {n}"
        );
    }
}

#[test]
fn state_at_does_not_move_the_cursor() {
    let tape = arithmetic_tape();
    let before = tape.position();
    let _ = tape.state_at(0);
    let _ = tape.state_at(2);
    assert_eq!(tape.position(), before);
}

#[tokio::test]
async fn play_replays_to_the_end_yielding_between_steps() {
    let tape = five_event_tape().rewind();
    let played = tape.play().await;
    assert_eq!(played.position(), 4);
    assert_eq!(played.state().result, 15);
}

#[test]
fn foreign_events_replay_as_no_ops() {
    let handlers = Arc::new(
        HandlerRegistry::from_handlers(reel_core::test_support::arithmetic_handlers()).unwrap(),
    );
    let events = vec![
        MATH_ADD.create(MathOperand { value: 3 }).unwrap(),
        event("observer:noted", json!({ "note": "ignored by the fold" })),
        MATH_ADD.create(MathOperand { value: 4 }).unwrap(),
    ];
    let tape = Tape::new(events, handlers, Default::default());
    assert_eq!(tape.state_at(0).result, 3);
    assert_eq!(tape.state_at(1).result, 3);
    assert_eq!(tape.state_at(2).result, 7);
}
