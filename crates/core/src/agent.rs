// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative agent definitions.
//!
//! An agent turns an activation event into a provider call whose
//! structured output is validated against a JSON schema and mapped back to
//! events. The definition is pure data plus projector closures; execution
//! lives in the engine.

use crate::error::AgentError;
use crate::event::Event;
use crate::pattern::Pattern;
use serde_json::Value;
use std::fmt;

/// Role of one prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

crate::simple_display! {
    PromptRole {
        System => "system",
        User => "user",
        Assistant => "assistant",
    }
}

/// One message of a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

/// The prompt an agent sends to its provider, projected from `(state, event)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptParts {
    pub messages: Vec<PromptMessage>,
}

impl PromptParts {
    /// A prompt consisting of a single user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::default().message(PromptRole::User, content)
    }

    pub fn message(mut self, role: PromptRole, content: impl Into<String>) -> Self {
        self.messages.push(PromptMessage {
            role,
            content: content.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

pub type PromptFn<S> = dyn Fn(&S, &Event) -> PromptParts + Send + Sync;
pub type GuardFn<S> = dyn Fn(&S) -> bool + Send + Sync;
pub type OnOutputFn = dyn Fn(&Value, &Event) -> Vec<Event> + Send + Sync;

/// A declarative LLM invocation: activation patterns, guard, prompt
/// projector, mandatory output schema, and emission mapper.
pub struct AgentDef<S> {
    name: String,
    activates_on: Vec<Pattern>,
    emits: Vec<String>,
    output_schema: Value,
    prompt: Box<PromptFn<S>>,
    when: Option<Box<GuardFn<S>>>,
    on_output: Box<OnOutputFn>,
}

impl<S> AgentDef<S> {
    pub fn builder(name: impl Into<String>) -> AgentBuilder<S> {
        AgentBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn activates_on(&self) -> &[Pattern] {
        &self.activates_on
    }

    /// Event names this agent may emit through `on_output`.
    pub fn emits(&self) -> &[String] {
        &self.emits
    }

    pub fn output_schema(&self) -> &Value {
        &self.output_schema
    }

    /// True when `event_name` matches any activation pattern.
    pub fn activates_for(&self, event_name: &str) -> bool {
        Pattern::any_match(&self.activates_on, event_name)
    }

    /// Evaluate the guard predicate; absent guard means always true.
    pub fn permits(&self, state: &S) -> bool {
        self.when.as_ref().is_none_or(|guard| guard(state))
    }

    pub fn prompt(&self, state: &S, event: &Event) -> PromptParts {
        (self.prompt)(state, event)
    }

    /// Map validated structured output to emission events.
    pub fn map_output(&self, output: &Value, trigger: &Event) -> Vec<Event> {
        (self.on_output)(output, trigger)
    }
}

impl<S> fmt::Debug for AgentDef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentDef")
            .field("name", &self.name)
            .field("activates_on", &self.activates_on)
            .field("emits", &self.emits)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AgentDef`]. Construction without an output schema fails
/// synchronously; structured output is part of the contract.
pub struct AgentBuilder<S> {
    name: String,
    activates_on: Vec<Pattern>,
    emits: Vec<String>,
    output_schema: Option<Value>,
    prompt: Option<Box<PromptFn<S>>>,
    when: Option<Box<GuardFn<S>>>,
    on_output: Option<Box<OnOutputFn>>,
}

impl<S> AgentBuilder<S> {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activates_on: Vec::new(),
            emits: Vec::new(),
            output_schema: None,
            prompt: None,
            when: None,
            on_output: None,
        }
    }

    /// Add an activation pattern.
    pub fn activates_on(mut self, pattern: Pattern) -> Self {
        self.activates_on.push(pattern);
        self
    }

    /// Declare an event name this agent emits.
    pub fn emits(mut self, name: impl Into<String>) -> Self {
        self.emits.push(name.into());
        self
    }

    /// JSON schema the provider's structured output must satisfy.
    pub fn output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn prompt<F>(mut self, f: F) -> Self
    where
        F: Fn(&S, &Event) -> PromptParts + Send + Sync + 'static,
    {
        self.prompt = Some(Box::new(f));
        self
    }

    /// Guard predicate over state; activation is skipped when false.
    pub fn when<F>(mut self, f: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.when = Some(Box::new(f));
        self
    }

    pub fn on_output<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Event) -> Vec<Event> + Send + Sync + 'static,
    {
        self.on_output = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<AgentDef<S>, AgentError> {
        let output_schema = self
            .output_schema
            .ok_or_else(|| AgentError::MissingOutputSchema(self.name.clone()))?;
        Ok(AgentDef {
            name: self.name,
            activates_on: self.activates_on,
            emits: self.emits,
            output_schema,
            prompt: self
                .prompt
                .unwrap_or_else(|| Box::new(|_, event: &Event| default_prompt(event))),
            when: self.when,
            on_output: self.on_output.unwrap_or_else(|| Box::new(|_, _| Vec::new())),
        })
    }
}

/// Default prompt: the triggering event's payload as a user message.
fn default_prompt(event: &Event) -> PromptParts {
    PromptParts::user(event.payload.to_string())
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
