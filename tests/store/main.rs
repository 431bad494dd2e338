//! Store handle lifecycle: commits, subscriptions, recovery and shutdown.

#[path = "../support/mod.rs"]
mod support;

use std::time::Duration;

use sourced_todos::{
    ConflictPolicy, StoreConfig, StoreError, TodoCreated, TodoEvent, TodoStore,
};
use support::todo::{creates, open_store, wait_for, watch};

// --- Commits ---

#[test]
fn commit_returns_increasing_sequences() {
    let store = open_store();
    let todos = creates(&["one", "two"]);

    assert_eq!(store.commit(todos[0].1.clone()).unwrap(), 1);
    assert_eq!(store.commit(todos[1].1.clone()).unwrap(), 2);
    assert_eq!(store.sequence().unwrap(), 2);

    let names: Vec<String> = store.history().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["v1.TodoCreated", "v1.TodoCreated"]);
}

#[test]
fn todos_are_newest_first() {
    let store = open_store();
    let todos = creates(&["old", "middle", "new"]);
    store
        .commit_all(todos.iter().map(|(_, e)| e.clone()))
        .unwrap();

    let texts: Vec<String> = store.todos().unwrap().into_iter().map(|t| t.text).collect();
    assert_eq!(texts, vec!["new", "middle", "old"]);
}

#[test]
fn commit_rejects_blank_text() {
    let store = open_store();
    let err = store
        .commit(TodoEvent::TodoCreated(TodoCreated::new("  ", 1)))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.sequence().unwrap(), 0);
}

#[test]
fn duplicate_create_rejected_without_side_effects() {
    let store = open_store();
    let todos = creates(&["one"]);
    store.commit(todos[0].1.clone()).unwrap();

    let err = store.commit(todos[0].1.clone()).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(store.history().unwrap().len(), 1);
}

#[test]
fn redelivered_create_tolerated_with_keep_first() {
    let config = StoreConfig::default().with_conflict_policy(ConflictPolicy::KeepFirst);
    let store = TodoStore::open(config).unwrap();
    let todos = creates(&["one"]);

    store.commit(todos[0].1.clone()).unwrap();
    store.commit(todos[0].1.clone()).unwrap();

    assert_eq!(store.todos().unwrap().len(), 1);
    assert_eq!(store.history().unwrap().len(), 2);
}

#[test]
fn query_reads_current_snapshot() {
    let store = open_store();
    let todos = creates(&["one", "two", "three"]);
    store
        .commit_all(todos.iter().map(|(_, e)| e.clone()))
        .unwrap();
    store
        .commit(TodoEvent::toggled(todos[0].0.clone(), true))
        .unwrap();

    let active = store
        .query(|snapshot| snapshot.rows().filter(|row| !row.completed).count())
        .unwrap();
    assert_eq!(active, 2);
}

#[test]
fn clones_share_state() {
    let store = open_store();
    let other = store.clone();
    let todos = creates(&["shared"]);

    other.commit(todos[0].1.clone()).unwrap();

    assert!(store.get(&todos[0].0).unwrap().is_some());
}

// --- Subscriptions ---

#[test]
fn subscribers_receive_ordered_todos() {
    let store = open_store();
    let rx = watch(&store);
    let todos = creates(&["first", "second"]);

    store.commit(todos[0].1.clone()).unwrap();
    let sequence = store.commit(todos[1].1.clone()).unwrap();

    let change = wait_for(&rx, sequence);
    let texts: Vec<&str> = change.todos.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["second", "first"]);
}

#[test]
fn batch_commit_notifies_once() {
    let store = open_store();
    let rx = watch(&store);
    let todos = creates(&["a", "b", "c"]);

    let sequence = store
        .commit_all(todos.iter().map(|(_, e)| e.clone()))
        .unwrap();

    let change = wait_for(&rx, sequence);
    assert_eq!(change.todos.len(), 3);
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn no_op_commit_does_not_notify() {
    let store = open_store();
    let rx = watch(&store);

    store.commit(TodoEvent::deleted("missing")).unwrap();

    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn unsubscribe_stops_notifications() {
    let store = open_store();
    let (tx, rx) = std::sync::mpsc::channel();
    let id = store
        .subscribe(move |change| {
            let _ = tx.send(change);
        })
        .unwrap();
    assert_eq!(store.subscriber_count().unwrap(), 1);

    assert!(store.unsubscribe(&id).unwrap());
    assert!(!store.unsubscribe(&id).unwrap());
    assert_eq!(store.subscriber_count().unwrap(), 0);

    store.commit(creates(&["quiet"])[0].1.clone()).unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

// --- Recovery ---

#[test]
fn from_history_rebuilds_same_state() {
    let store = open_store();
    let todos = creates(&["a", "b", "c"]);
    store
        .commit_all(todos.iter().map(|(_, e)| e.clone()))
        .unwrap();
    store
        .commit(TodoEvent::toggled(todos[1].0.clone(), true))
        .unwrap();
    store.commit(TodoEvent::deleted(todos[2].0.clone())).unwrap();

    let rebuilt =
        TodoStore::from_history(StoreConfig::default(), store.history().unwrap()).unwrap();

    assert_eq!(rebuilt.snapshot().unwrap(), store.snapshot().unwrap());
    assert_eq!(rebuilt.sequence().unwrap(), store.sequence().unwrap());
}

#[test]
fn from_history_rejects_invalid_record() {
    let store = open_store();
    store.commit(creates(&["a"])[0].1.clone()).unwrap();
    let mut history = store.history().unwrap();
    history[0].args["createdAt"] = serde_json::json!("yesterday");

    let err = TodoStore::from_history(StoreConfig::default(), history).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn restore_from_checkpoint_replays_only_the_tail() {
    let store = open_store();
    let todos = creates(&["a", "b"]);
    store
        .commit_all(todos.iter().map(|(_, e)| e.clone()))
        .unwrap();
    let checkpoint = store.checkpoint().unwrap();
    assert_eq!(checkpoint.sequence, 2);

    store
        .commit(TodoEvent::toggled(todos[0].0.clone(), true))
        .unwrap();
    store.commit(TodoEvent::completed_cleared()).unwrap();

    // The full history is passed; the first two records are covered by the checkpoint.
    let restored =
        TodoStore::restore(StoreConfig::default(), checkpoint, store.history().unwrap()).unwrap();

    assert_eq!(restored.snapshot().unwrap(), store.snapshot().unwrap());
    assert_eq!(restored.sequence().unwrap(), 4);
    assert_eq!(restored.history().unwrap().len(), 2);
    assert_eq!(restored.latest_checkpoint().unwrap().unwrap().sequence, 2);
}

#[test]
fn restore_rejects_missing_tail_record() {
    let store = open_store();
    let todos = creates(&["a", "b", "c"]);
    store
        .commit_all(todos[..2].iter().map(|(_, e)| e.clone()))
        .unwrap();
    let checkpoint = store.checkpoint().unwrap();
    store.commit(todos[2].1.clone()).unwrap();
    store
        .commit(TodoEvent::toggled(todos[0].0.clone(), true))
        .unwrap();

    let mut history = store.history().unwrap();
    history.remove(2);

    let err = TodoStore::restore(StoreConfig::default(), checkpoint, history).unwrap_err();
    assert_eq!(err, StoreError::SequenceGap { expected: 3, found: 4 });
}

#[test]
fn from_history_rejects_gaps_and_reordering() {
    let store = open_store();
    store
        .commit_all(creates(&["a", "b", "c"]).into_iter().map(|(_, e)| e))
        .unwrap();
    let history = store.history().unwrap();

    let mut missing_first = history.clone();
    missing_first.remove(0);
    let err = TodoStore::from_history(StoreConfig::default(), missing_first).unwrap_err();
    assert_eq!(err, StoreError::SequenceGap { expected: 1, found: 2 });

    let mut swapped = history;
    swapped.swap(1, 2);
    let err = TodoStore::from_history(StoreConfig::default(), swapped).unwrap_err();
    assert_eq!(err, StoreError::SequenceGap { expected: 2, found: 3 });
}

#[test]
fn checkpoint_survives_json() {
    let store = open_store();
    store.commit(creates(&["a"])[0].1.clone()).unwrap();
    let encoded = serde_json::to_string(&store.checkpoint().unwrap()).unwrap();

    let restored =
        TodoStore::restore(StoreConfig::default(), serde_json::from_str(&encoded).unwrap(), [])
            .unwrap();

    assert_eq!(restored.todos().unwrap(), store.todos().unwrap());
}

// --- Shutdown ---

#[test]
fn shutdown_drops_listeners_and_blocks_commits() {
    let store = open_store();
    let rx = watch(&store);

    store.shutdown().unwrap();

    assert_eq!(store.subscriber_count().unwrap(), 0);
    assert_eq!(
        store.commit(creates(&["late"])[0].1.clone()).unwrap_err(),
        StoreError::Closed
    );
    assert_eq!(store.subscribe(|_| {}).unwrap_err(), StoreError::Closed);
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}
