// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow runtime.
//!
//! One `run` drives one session: a queue seeded with `user:input`, a
//! single-threaded cooperative loop that persists, reduces, activates
//! agents, and fans out to renderers, phase by phase. Agent executions are
//! async tasks; their translated events are serialized into the same
//! queue in arrival order. The loop holds at every phase boundary while
//! paused and stops activating agents once the `until` predicate holds,
//! draining in-flight work before returning.

use crate::agents::{run_agent, AgentRegistry};
use crate::bus::EventBus;
use crate::error::RuntimeError;
use crate::handlers::HandlerRegistry;
use crate::renderers::RendererSet;
use crate::tape::Tape;
use reel_core::names::{self, UserInput};
use reel_core::{AgentDef, Clock, Event, Handler, RendererDef, SessionId, SystemClock};
use reel_providers::{Provider, ProviderConfig, ProviderError};
use reel_storage::{EventStore, MemoryStore, StateSnapshot};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Bounds every workflow state type must satisfy. Serialization feeds
/// state snapshots; everything else is plumbing.
pub trait WorkflowState: Clone + Send + Sync + Serialize + 'static {}
impl<T: Clone + Send + Sync + Serialize + 'static> WorkflowState for T {}

type UntilFn<S> = dyn Fn(&S) -> bool + Send + Sync;

/// Options for one `run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: String,
    /// Persist events (and snapshots) to the store as they dispatch.
    pub record: bool,
    /// Deterministic session id; fresh UUID when absent.
    pub session_id: Option<SessionId>,
}

impl RunOptions {
    pub fn input(text: impl Into<String>) -> Self {
        Self {
            input: text.into(),
            record: true,
            session_id: None,
        }
    }

    pub fn session(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn record(mut self, record: bool) -> Self {
        self.record = record;
        self
    }
}

/// An abnormal end of a run that still returned an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub code: String,
    pub message: String,
}

/// Everything a finished run hands back.
pub struct RunOutcome<S> {
    pub state: S,
    pub events: Vec<Event>,
    pub tape: Tape<S>,
    pub terminated: bool,
    pub session_id: SessionId,
    pub error: Option<RunFailure>,
}

/// Builder for [`Workflow`]. Registry duplicates and missing requirements
/// fail here, at construction.
pub struct WorkflowBuilder<S, C: Clock = SystemClock> {
    name: String,
    initial_state: Option<S>,
    handlers: Vec<Handler<S>>,
    agents: Vec<AgentDef<S>>,
    renderers: Vec<RendererDef<S>>,
    store: Option<Arc<dyn EventStore>>,
    until: Option<Box<UntilFn<S>>>,
    provider: Option<Arc<dyn Provider>>,
    provider_config: ProviderConfig,
    clock: C,
}

impl<S: WorkflowState> WorkflowBuilder<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial_state: None,
            handlers: Vec::new(),
            agents: Vec::new(),
            renderers: Vec::new(),
            store: None,
            until: None,
            provider: None,
            provider_config: ProviderConfig::default(),
            clock: SystemClock,
        }
    }
}

impl<S: WorkflowState, C: Clock> WorkflowBuilder<S, C> {
    pub fn initial_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    pub fn handler(mut self, handler: Handler<S>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn handlers(mut self, handlers: impl IntoIterator<Item = Handler<S>>) -> Self {
        self.handlers.extend(handlers);
        self
    }

    pub fn agent(mut self, agent: AgentDef<S>) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn renderer(mut self, renderer: RendererDef<S>) -> Self {
        self.renderers.push(renderer);
        self
    }

    pub fn store(mut self, store: Arc<dyn EventStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Termination predicate over state, checked after every reduction.
    pub fn until<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.until = Some(Box::new(predicate));
        self
    }

    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn provider_config(mut self, config: ProviderConfig) -> Self {
        self.provider_config = config;
        self
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> WorkflowBuilder<S, C2> {
        WorkflowBuilder {
            name: self.name,
            initial_state: self.initial_state,
            handlers: self.handlers,
            agents: self.agents,
            renderers: self.renderers,
            store: self.store,
            until: self.until,
            provider: self.provider,
            provider_config: self.provider_config,
            clock,
        }
    }

    pub fn build(self) -> Result<Workflow<S, C>, RuntimeError> {
        let handlers = Arc::new(HandlerRegistry::from_handlers(self.handlers)?);
        let agents = AgentRegistry::from_defs(self.agents)?;
        let renderers = RendererSet::from_defs(self.renderers)?;
        if !agents.is_empty() && self.provider.is_none() {
            return Err(RuntimeError::MissingProvider);
        }
        let initial_state = self
            .initial_state
            .ok_or_else(|| RuntimeError::Config("initial state is required".into()))?;
        let (bus, external_rx) = EventBus::channel(handlers.clone(), agents, renderers);
        Ok(Workflow {
            inner: Arc::new(WorkflowInner {
                name: self.name,
                initial_state,
                handlers,
                bus,
                external_rx: tokio::sync::Mutex::new(external_rx),
                store: self
                    .store
                    .unwrap_or_else(|| Arc::new(MemoryStore::new())),
                until: self.until.unwrap_or_else(|| Box::new(|_| false)),
                provider: self.provider,
                provider_config: self.provider_config,
                paused: AtomicBool::new(false),
                pause_notify: Notify::new(),
                cancel: CancellationToken::new(),
                clock: self.clock,
            }),
        })
    }
}

impl<S, C: Clock> std::fmt::Debug for WorkflowInner<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowInner")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

struct WorkflowInner<S, C: Clock> {
    name: String,
    initial_state: S,
    handlers: Arc<HandlerRegistry<S>>,
    bus: EventBus<S>,
    /// Drained by the active run; the lock serializes runs so a session
    /// has a single writer.
    external_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Event>>,
    store: Arc<dyn EventStore>,
    until: Box<UntilFn<S>>,
    provider: Option<Arc<dyn Provider>>,
    provider_config: ProviderConfig,
    paused: AtomicBool,
    pause_notify: Notify,
    cancel: CancellationToken,
    clock: C,
}

/// A configured workflow. Cheap to clone; all clones share registries,
/// store, pause flag, and the dispose token.
pub struct Workflow<S, C: Clock = SystemClock> {
    inner: Arc<WorkflowInner<S, C>>,
}

impl<S, C: Clock> std::fmt::Debug for Workflow<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}

impl<S, C: Clock> Clone for Workflow<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: WorkflowState> Workflow<S> {
    pub fn builder(name: impl Into<String>) -> WorkflowBuilder<S> {
        WorkflowBuilder::new(name)
    }
}

impl<S: WorkflowState, C: Clock> Workflow<S, C> {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn store(&self) -> Arc<dyn EventStore> {
        self.inner.store.clone()
    }

    /// The workflow's event bus. External channels (voice, HITL prompts)
    /// use `emit` to serialize events onto the run queue; nothing else may
    /// push into it.
    pub fn bus(&self) -> EventBus<S> {
        self.inner.bus.clone()
    }

    /// Drive one session to completion.
    ///
    /// The returned future rejects only on store-append failures and
    /// internal invariant violations; provider and handler failures are
    /// recorded in-band as `error:occurred` events.
    pub async fn run(&self, options: RunOptions) -> Result<RunOutcome<S>, RuntimeError> {
        let inner = &self.inner;
        let started = inner.clock.now();
        let session_id = options
            .session_id
            .clone()
            .unwrap_or_else(SessionId::fresh);
        let run_cancel = inner.cancel.child_token();

        let bus = inner.bus.clone();
        // Holding the receiver for the whole run keeps a session
        // single-writer; a concurrent run waits here.
        let mut external_rx = inner.external_rx.lock().await;
        let (agent_tx, mut agent_rx) = mpsc::unbounded_channel::<Event>();
        let mut agent_tasks: JoinSet<Result<(), ProviderError>> = JoinSet::new();

        let seed = names::USER_INPUT
            .create(UserInput {
                text: options.input.clone(),
            })
            .map_err(|err| RuntimeError::ExecutionFailed(err.to_string()))?;

        let mut queue: VecDeque<Event> = VecDeque::from([seed]);
        let mut state = inner.initial_state.clone();
        let mut log: Vec<Event> = Vec::new();
        let mut terminated = false;
        let mut failure: Option<RunFailure> = None;

        tracing::info!(workflow = %inner.name, session = %session_id, "run started");

        loop {
            self.pause_point().await;

            if run_cancel.is_cancelled() {
                terminated = true;
                failure.get_or_insert(RunFailure {
                    code: "ABORTED".into(),
                    message: "run disposed".into(),
                });
                break;
            }

            // Serialize externally emitted and agent-stream events into
            // the queue in arrival order.
            while let Ok(event) = external_rx.try_recv() {
                queue.push_back(event);
            }
            while let Ok(event) = agent_rx.try_recv() {
                queue.push_back(event);
            }

            let Some(event) = queue.pop_front() else {
                if agent_tasks.is_empty() {
                    break;
                }
                tokio::select! {
                    _ = run_cancel.cancelled() => {}
                    received = agent_rx.recv() => {
                        if let Some(event) = received {
                            queue.push_back(event);
                        }
                    }
                    received = external_rx.recv() => {
                        if let Some(event) = received {
                            queue.push_back(event);
                        }
                    }
                    joined = agent_tasks.join_next() => log_agent_join(joined),
                }
                continue;
            };

            // Phase: persist. Store failures are fatal for the run.
            if options.record {
                inner.store.append(&session_id, &event).await?;
            }

            // Phase: reduce.
            let reduction = bus.reduce(&event, state.clone());
            let next_state = reduction.state;
            for emitted in reduction.emitted {
                queue.push_back(emitted);
            }

            let position = log.len();
            log.push(event.clone());

            if options.record {
                match serde_json::to_value(&next_state) {
                    Ok(value) => {
                        let snapshot = StateSnapshot {
                            state: value,
                            position,
                            event_id: event.id,
                        };
                        if let Err(err) = inner.store.record_snapshot(&session_id, snapshot).await
                        {
                            tracing::warn!(error = %err, "snapshot write failed");
                        }
                    }
                    Err(err) => tracing::warn!(error = %err, "state not snapshottable"),
                }
            }

            // Phase: agents. New activations stop once the run is
            // terminating; in-flight streams drain regardless.
            if !terminated {
                if let Some(provider) = &inner.provider {
                    for agent in bus.matching_agents(&event, &next_state) {
                        tracing::debug!(
                            agent = agent.name(),
                            event = %event.log_summary(),
                            "agent activated"
                        );
                        agent_tasks.spawn(run_agent(
                            agent,
                            event.clone(),
                            next_state.clone(),
                            provider.clone(),
                            inner.provider_config.clone(),
                            session_id.clone(),
                            agent_tx.clone(),
                            run_cancel.child_token(),
                        ));
                    }
                }
            }

            // Phase: render. Fire-and-forget; never awaited here.
            bus.render_async(&event, &next_state);

            state = next_state;
            if !terminated && (inner.until)(&state) {
                tracing::info!(
                    workflow = %inner.name,
                    session = %session_id,
                    "until predicate satisfied; draining in-flight agents"
                );
                terminated = true;
            }
        }

        // On the cancellation path tasks may still be alive.
        while let Some(joined) = agent_tasks.join_next().await {
            log_agent_join(Some(joined));
        }

        let elapsed_ms = inner
            .clock
            .now()
            .duration_since(started)
            .as_millis() as u64;
        tracing::info!(
            workflow = %inner.name,
            session = %session_id,
            events = log.len(),
            terminated,
            elapsed_ms,
            "run finished"
        );

        let tape = Tape::new(log.clone(), inner.handlers.clone(), inner.initial_state.clone());
        Ok(RunOutcome {
            state,
            events: log,
            tape,
            terminated,
            session_id,
            error: failure,
        })
    }

    /// Restore a tape over a persisted session.
    pub async fn load(&self, session_id: &SessionId) -> Result<Tape<S>, RuntimeError> {
        let events = self.inner.store.events(session_id).await?;
        Ok(Tape::new(
            events,
            self.inner.handlers.clone(),
            self.inner.initial_state.clone(),
        ))
    }

    /// Hold the loop at its next phase boundary.
    pub fn pause(&self) {
        self.inner.paused.store(true, Ordering::SeqCst);
    }

    /// Wake a paused loop.
    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::SeqCst);
        self.inner.pause_notify.notify_one();
    }

    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::SeqCst)
    }

    /// Abort in-flight agent streams and end any active run.
    pub async fn dispose(&self) {
        self.inner.cancel.cancel();
    }

    async fn pause_point(&self) {
        while self.inner.paused.load(Ordering::SeqCst) {
            self.inner.pause_notify.notified().await;
        }
    }
}

fn log_agent_join(joined: Option<Result<Result<(), ProviderError>, tokio::task::JoinError>>) {
    match joined {
        Some(Ok(Ok(()))) => {}
        Some(Ok(Err(err))) => tracing::warn!(error = %err, "agent task failed"),
        Some(Err(err)) => tracing::error!(error = %err, "agent task died"),
        None => {}
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
