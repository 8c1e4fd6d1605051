// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite persistence specs.

use reel_core::test_support::event;
use reel_core::{Handler, HandlerResult, SessionId};
use reel_engine::{RunOptions, Workflow};
use reel_storage::{EventStore, SqliteStore};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn events_survive_across_store_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.db");
    let session = SessionId::new("s");

    let first = event(
        "note:written",
        json!({ "text": "snow 雪 ☃", "tags": ["a"], "meta": { "empty": {} } }),
    );
    let second = event("note:written", json!({ "text": "two", "n": 2 })).caused_by(first.id);

    {
        let store = SqliteStore::open(&path).unwrap();
        store.append(&session, &first).await.unwrap();
        store.append(&session, &second).await.unwrap();
    }

    let reopened = SqliteStore::open(&path).unwrap();
    let read = reopened.events(&session).await.unwrap();
    assert_eq!(read, vec![first, second]);

    let metas = reopened.sessions().await.unwrap();
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0].event_count, 2);
}

#[derive(Debug, Clone, Default, Serialize)]
struct Notes {
    count: u32,
}

#[tokio::test]
async fn workflow_sessions_recorded_to_sqlite_reload_as_tapes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path().join("flow.db")).unwrap());

    let build = |store: Arc<SqliteStore>| {
        Workflow::<Notes>::builder("sqlite-backed")
            .initial_state(Notes::default())
            .handler(Handler::named("user:input", "count", |_, mut state: Notes| {
                state.count += 1;
                Ok(HandlerResult::with_events(
                    state,
                    vec![event("note:written", json!({ "text": "remembered" }))],
                ))
            }))
            .handler(Handler::named("note:written", "count-note", |_, mut state: Notes| {
                state.count += 1;
                Ok(HandlerResult::state(state))
            }))
            .store(store)
            .build()
            .unwrap()
    };

    let session = SessionId::new("persisted-run");
    let workflow = build(store.clone());
    let outcome = workflow
        .run(RunOptions::input("hello").session(session.clone()))
        .await
        .unwrap();
    assert_eq!(outcome.state.count, 2);

    // A second workflow instance over the same file sees the same log.
    let reloaded = build(store).load(&session).await.unwrap();
    assert_eq!(reloaded.len(), outcome.events.len());
    assert_eq!(reloaded.state().count, 2);
    assert_eq!(reloaded.events(), &outcome.events[..]);
}

#[tokio::test]
async fn sqlite_store_reports_no_snapshots() {
    let store = SqliteStore::open_in_memory().unwrap();
    let session = SessionId::new("s");
    store.append(&session, &event("a:b", json!({}))).await.unwrap();
    assert!(store.snapshot(&session, 0).await.unwrap().is_none());
}
