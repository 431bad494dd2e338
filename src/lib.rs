//! Event-sourced state for a todo list.
//!
//! Events are the only way state changes. The [`EventRegistry`] validates events that arrive
//! as JSON, the [`reducer`] materializes each event into row operations on a [`Snapshot`], and
//! a [`TodoStore`] owns one snapshot plus its history and notifies subscribers on change.
//!
//! ```ignore
//! use sourced_todos::{StoreConfig, TodoCreated, TodoEvent, TodoStore};
//!
//! let store = TodoStore::open(StoreConfig::default())?;
//! store.subscribe(|change| println!("{} todos", change.todos.len()))?;
//!
//! let created = TodoCreated::now("buy milk");
//! let id = created.id.clone();
//! store.commit(TodoEvent::TodoCreated(created))?;
//! store.commit(TodoEvent::toggled(id, true))?;
//! store.shutdown()?;
//! ```

mod event;
pub mod reducer;
mod schema;
mod snapshot;
mod store;

pub use event::{
    AllTodosCompleted, EventKind, EventName, EventRecord, TodoCreated, TodoDeleted, TodoEvent,
    TodoTextUpdated, TodoToggled, SCHEMA_VERSION,
};
pub use reducer::{apply, materialize, replay, ConflictError, ConflictPolicy, Reducer};
pub use schema::{
    EventDefinition, EventRegistry, FieldSpec, FieldType, PayloadShape, SchemaError,
    ValidationError,
};
pub use snapshot::{
    Checkpoint, CheckpointError, RowOp, RowPatch, Snapshot, TodoRow, COLUMNS, TABLE,
};
pub use store::{StoreConfig, StoreError, SubscriptionId, TodoStore, TodosChanged};
