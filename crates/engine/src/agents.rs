// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry and execution.
//!
//! Activation is registration order: every agent whose pattern matches the
//! dispatched event and whose guard passes gets one provider call. The
//! call streams translated events into the run loop as they arrive, then
//! validates structured output against the agent's schema and maps it to
//! emission events. Failures become in-band `error:occurred` records and
//! also fail the agent task.

use crate::error::AgentRegistryError;
use futures_util::StreamExt;
use reel_core::names::{self, AgentCompleted, AgentStarted, ErrorOccurred};
use reel_core::{AgentDef, Event, EventId, SessionId};
use reel_providers::{
    OutputFormat, Provider, ProviderConfig, ProviderError, ProviderRequest, Translation,
    Translator,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Agents in registration order.
#[derive(Debug)]
pub struct AgentRegistry<S> {
    agents: Vec<Arc<AgentDef<S>>>,
}

impl<S> Default for AgentRegistry<S> {
    fn default() -> Self {
        Self { agents: Vec::new() }
    }
}

impl<S> Clone for AgentRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            agents: self.agents.clone(),
        }
    }
}

impl<S> AgentRegistry<S> {
    pub fn from_defs(
        defs: impl IntoIterator<Item = AgentDef<S>>,
    ) -> Result<Self, AgentRegistryError> {
        let mut names = HashSet::new();
        let mut agents = Vec::new();
        for def in defs {
            if !names.insert(def.name().to_string()) {
                return Err(AgentRegistryError::DuplicateName(def.name().to_string()));
            }
            agents.push(Arc::new(def));
        }
        Ok(Self { agents })
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Agents activated by `event_name` under `state`, in registration
    /// order.
    pub fn matching(&self, event_name: &str, state: &S) -> Vec<Arc<AgentDef<S>>> {
        self.agents
            .iter()
            .filter(|agent| agent.activates_for(event_name) && agent.permits(state))
            .cloned()
            .collect()
    }
}

/// One agent invocation, driven to completion.
///
/// Translated stream events are forwarded through `events_tx` as they
/// arrive, each attributed to the triggering event.
pub(crate) async fn run_agent<S>(
    agent: Arc<AgentDef<S>>,
    trigger: Event,
    state: S,
    provider: Arc<dyn Provider>,
    config: ProviderConfig,
    session_id: SessionId,
    events_tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
) -> Result<(), ProviderError>
where
    S: Send + Sync + 'static,
{
    let agent_name = agent.name().to_string();
    forward(
        &events_tx,
        names::AGENT_STARTED.create_caused_by(
            AgentStarted {
                agent_name: agent_name.clone(),
            },
            trigger.id,
        ),
    );

    let prompt = agent.prompt(&state, &trigger);
    let mut config = config;
    if config.output_format.is_none() {
        config.output_format = Some(OutputFormat::JsonSchema {
            schema: agent.output_schema().clone(),
        });
    }
    let timeout = config.timeout_ms.map(std::time::Duration::from_millis);
    let request = ProviderRequest {
        messages: prompt.messages,
        config,
        session_id: Some(session_id.clone()),
        agent_name: Some(agent_name.clone()),
        cancel: Some(cancel.clone()),
    };

    let drive = drive_stream(&*provider, request, &agent_name, trigger.id, &events_tx);
    let driven = match timeout {
        Some(limit) => match tokio::time::timeout(limit, drive).await {
            Ok(result) => result,
            Err(_) => {
                // Fire this invocation's token so the adapter unwinds.
                cancel.cancel();
                Err(ProviderError::provider(
                    format!("provider turn timed out after {}ms", limit.as_millis()),
                    true,
                ))
            }
        },
        None => drive.await,
    };
    let translation = match driven {
        Ok(translation) => translation,
        Err(err) => {
            emit_error(&events_tx, &agent_name, "provider", &err.to_string(), err.retryable, trigger.id);
            return Err(err);
        }
    };

    // Structured output: the backend's explicit output, or the turn text
    // parsed as JSON when the backend streams it in-band.
    let output = translation.output.clone().or_else(|| {
        translation
            .text
            .as_deref()
            .and_then(|text| serde_json::from_str::<Value>(text).ok())
    });
    let Some(output) = output else {
        let err = ProviderError::provider("turn produced no structured output", false);
        emit_error(&events_tx, &agent_name, "parse", &err.message, false, trigger.id);
        return Err(err);
    };
    if let Err(message) = validate_output(agent.output_schema(), &output) {
        emit_error(&events_tx, &agent_name, "parse", &message, false, trigger.id);
        return Err(ProviderError::provider(message, false));
    }

    forward(
        &events_tx,
        names::AGENT_COMPLETED.create_caused_by(
            AgentCompleted {
                agent_name: agent_name.clone(),
                output: output.clone(),
            },
            trigger.id,
        ),
    );
    for mut event in agent.map_output(&output, &trigger) {
        if event.caused_by.is_none() {
            event.caused_by = Some(trigger.id);
        }
        if events_tx.send(event).is_err() {
            break;
        }
    }
    Ok(())
}

async fn drive_stream(
    provider: &dyn Provider,
    request: ProviderRequest,
    agent_name: &str,
    trigger_id: EventId,
    events_tx: &mpsc::UnboundedSender<Event>,
) -> Result<Translation, ProviderError> {
    let session_hint = request.session_id.clone();
    let mut stream = provider.stream(request).await?;
    let mut translator = Translator::new(Some(agent_name.to_string()), session_hint);
    while let Some(item) = stream.next().await {
        for mut event in translator.apply(item?)? {
            if event.caused_by.is_none() {
                event.caused_by = Some(trigger_id);
            }
            if events_tx.send(event).is_err() {
                // The run loop is gone; stop consuming the backend.
                return Err(ProviderError::aborted());
            }
        }
    }
    translator.finish()
}

fn validate_output(schema: &Value, output: &Value) -> Result<(), String> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|err| format!("invalid output schema: {err}"))?;
    let errors: Vec<String> = validator
        .iter_errors(output)
        .map(|err| format!("{}: {err}", err.instance_path))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "structured output rejected by schema: {}",
            errors.join("; ")
        ))
    }
}

fn forward(events_tx: &mpsc::UnboundedSender<Event>, event: Result<Event, reel_core::EventError>) {
    match event {
        Ok(event) => {
            let _ = events_tx.send(event);
        }
        Err(err) => tracing::error!(error = %err, "failed to build agent lifecycle event"),
    }
}

fn emit_error(
    events_tx: &mpsc::UnboundedSender<Event>,
    agent_name: &str,
    kind: &str,
    message: &str,
    retryable: bool,
    trigger_id: EventId,
) {
    forward(
        events_tx,
        names::ERROR_OCCURRED.create_caused_by(
            ErrorOccurred {
                agent_name: Some(agent_name.to_string()),
                kind: kind.to_string(),
                message: message.to_string(),
                retryable,
            },
            trigger_id,
        ),
    );
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
