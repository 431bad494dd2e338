mod kind;
mod record;
mod todo_event;

pub use kind::{EventKind, EventName, SCHEMA_VERSION};
pub use record::EventRecord;
pub use todo_event::{
    AllTodosCompleted, TodoCreated, TodoDeleted, TodoEvent, TodoTextUpdated, TodoToggled,
};
