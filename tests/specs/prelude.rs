// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the workspace specs.

#![allow(dead_code)]

use reel_core::test_support::{arithmetic_events, arithmetic_handlers, Arith};
use reel_engine::{HandlerRegistry, Tape};
use std::sync::Arc;

/// The S1 fixture tape: add 10, multiply 2, add 5, multiply 3 over
/// `{ result: 0 }`.
pub fn arithmetic_tape() -> Tape<Arith> {
    let handlers = Arc::new(
        HandlerRegistry::from_handlers(arithmetic_handlers()).expect("fixture handlers"),
    );
    Tape::new(arithmetic_events(), handlers, Arith::default())
}
