// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders and fixture reducers shared across crates' tests.

use crate::event::{Event, EventDef};
use crate::handler::{Handler, HandlerResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shorthand event constructor for tests.
pub fn event(name: &str, payload: Value) -> Event {
    Event::new(name, payload)
}

/// Arithmetic fixture state used by replay and tape tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arith {
    pub result: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathOperand {
    pub value: i64,
}

pub const MATH_ADD: EventDef<MathOperand> = EventDef::new("math:add");
pub const MATH_MULTIPLY: EventDef<MathOperand> = EventDef::new("math:multiply");

/// Deterministic add/multiply reducers over [`Arith`].
pub fn arithmetic_handlers() -> Vec<Handler<Arith>> {
    vec![
        Handler::for_event(&MATH_ADD, "add", |event, state: Arith| {
            let operand = MATH_ADD.payload(event)?;
            Ok(HandlerResult::state(Arith {
                result: state.result + operand.value,
            }))
        }),
        Handler::for_event(&MATH_MULTIPLY, "multiply", |event, state: Arith| {
            let operand = MATH_MULTIPLY.payload(event)?;
            Ok(HandlerResult::state(Arith {
                result: state.result * operand.value,
            }))
        }),
    ]
}

/// The S1 fixture log: add 10, multiply 2, add 5, multiply 3.
pub fn arithmetic_events() -> Vec<Event> {
    [
        (MATH_ADD, 10),
        (MATH_MULTIPLY, 2),
        (MATH_ADD, 5),
        (MATH_MULTIPLY, 3),
    ]
    .into_iter()
    .filter_map(|(def, value)| def.create(MathOperand { value }).ok())
    .collect()
}
