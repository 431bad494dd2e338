//! Events arriving as JSON records from outside the process.

#[path = "../support/mod.rs"]
mod support;

use serde_json::json;
use sourced_todos::{
    EventRecord, EventRegistry, FieldType, StoreError, TodoEvent, ValidationError,
};
use support::todo::open_store;

#[test]
fn json_records_commit_through_the_registry() {
    let store = open_store();
    let wire = r#"[
        {"name":"v1.TodoCreated","args":{"id":"a","text":"buy milk","createdAt":1000},"sequence":7},
        {"name":"v1.TodoToggled","args":{"id":"a","completed":true},"sequence":8,"metadata":{"client_id":"tab-2"}}
    ]"#;
    let records: Vec<EventRecord> = serde_json::from_str(wire).unwrap();
    assert_eq!(records[1].client_id(), Some("tab-2"));

    for record in &records {
        store.commit_record(record).unwrap();
    }

    let row = store.get("a").unwrap().unwrap();
    assert!(row.completed);
    // Local sequences are assigned by the store.
    let sequences: Vec<u64> = store.history().unwrap().iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, vec![1, 2]);
}

#[test]
fn mistyped_payload_is_rejected_before_the_reducer() {
    let store = open_store();
    let record = EventRecord::new("v1.AllTodosCompleted", json!({ "completed": 1 }), 1);

    let err = store.commit_record(&record).unwrap_err();

    assert_eq!(
        err,
        StoreError::Validation(ValidationError::TypeMismatch {
            event: "v1.AllTodosCompleted".into(),
            field: "completed".into(),
            expected: FieldType::Boolean,
            found: "number",
        })
    );
    assert_eq!(store.sequence().unwrap(), 0);
}

#[test]
fn unknown_event_is_rejected() {
    let store = open_store();
    let record = EventRecord::new("v1.TodoArchived", json!({ "id": "a" }), 1);
    assert!(matches!(
        store.commit_record(&record),
        Err(StoreError::Validation(ValidationError::UnknownEvent { .. }))
    ));
}

#[test]
fn committed_history_is_valid_wire_input() {
    let store = open_store();
    store
        .commit_all([
            TodoEvent::created("a", "buy milk", 1000),
            TodoEvent::text_updated("a", "buy oat milk"),
            TodoEvent::all_completed(true),
            TodoEvent::completed_cleared(),
        ])
        .unwrap();

    let encoded = serde_json::to_string(&store.history().unwrap()).unwrap();
    let decoded: Vec<EventRecord> = serde_json::from_str(&encoded).unwrap();
    let registry = EventRegistry::todos().unwrap();
    let events: Vec<TodoEvent> = decoded
        .iter()
        .map(|record| registry.decode(record).unwrap())
        .collect();

    assert_eq!(events[1], TodoEvent::text_updated("a", "buy oat milk"));
    assert_eq!(events[3], TodoEvent::CompletedTodosCleared);
}

#[test]
fn whole_float_timestamps_from_javascript_are_accepted() {
    let registry = EventRegistry::todos().unwrap();
    let event = registry
        .construct(
            "v1.TodoCreated",
            &json!({ "id": "a", "text": "t", "createdAt": 1.7e12 }),
        )
        .unwrap();
    assert_eq!(event, TodoEvent::created("a", "t", 1_700_000_000_000));
}
