use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::kind::EventKind;
use super::record::EventRecord;
use crate::schema::ValidationError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoCreated {
    pub id: String,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl TodoCreated {
    /// Create with a freshly generated id. Ids are client-generated UUIDs.
    pub fn new(text: impl Into<String>, created_at: i64) -> Self {
        TodoCreated {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            created_at,
        }
    }

    /// Like [`TodoCreated::new`], stamped with the current time in milliseconds.
    ///
    /// The clock is read here, on the commit side, so materialization never has to.
    /// A clock set before the Unix epoch stamps `0` and logs a warning.
    pub fn now(text: impl Into<String>) -> Self {
        TodoCreated::new(text, epoch_millis(SystemTime::now()))
    }
}

fn epoch_millis(at: SystemTime) -> i64 {
    match at.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
        Err(err) => {
            warn!(
                behind_by = ?err.duration(),
                "system clock is before the Unix epoch; createdAt set to 0"
            );
            0
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoToggled {
    pub id: String,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoTextUpdated {
    pub id: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDeleted {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllTodosCompleted {
    pub completed: bool,
}

/// An immutable, typed fact about an intended change to the todo list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoEvent {
    TodoCreated(TodoCreated),
    TodoToggled(TodoToggled),
    TodoTextUpdated(TodoTextUpdated),
    TodoDeleted(TodoDeleted),
    AllTodosCompleted(AllTodosCompleted),
    CompletedTodosCleared,
}

impl TodoEvent {
    pub fn created(id: impl Into<String>, text: impl Into<String>, created_at: i64) -> Self {
        TodoEvent::TodoCreated(TodoCreated {
            id: id.into(),
            text: text.into(),
            created_at,
        })
    }

    pub fn toggled(id: impl Into<String>, completed: bool) -> Self {
        TodoEvent::TodoToggled(TodoToggled {
            id: id.into(),
            completed,
        })
    }

    pub fn text_updated(id: impl Into<String>, text: impl Into<String>) -> Self {
        TodoEvent::TodoTextUpdated(TodoTextUpdated {
            id: id.into(),
            text: text.into(),
        })
    }

    pub fn deleted(id: impl Into<String>) -> Self {
        TodoEvent::TodoDeleted(TodoDeleted { id: id.into() })
    }

    pub fn all_completed(completed: bool) -> Self {
        TodoEvent::AllTodosCompleted(AllTodosCompleted { completed })
    }

    pub fn completed_cleared() -> Self {
        TodoEvent::CompletedTodosCleared
    }

    pub fn kind(&self) -> EventKind {
        match self {
            TodoEvent::TodoCreated(_) => EventKind::TodoCreated,
            TodoEvent::TodoToggled(_) => EventKind::TodoToggled,
            TodoEvent::TodoTextUpdated(_) => EventKind::TodoTextUpdated,
            TodoEvent::TodoDeleted(_) => EventKind::TodoDeleted,
            TodoEvent::AllTodosCompleted(_) => EventKind::AllTodosCompleted,
            TodoEvent::CompletedTodosCleared => EventKind::CompletedTodosCleared,
        }
    }

    /// Versioned wire name, e.g. `v1.TodoCreated`.
    pub fn name(&self) -> String {
        self.kind().wire_name()
    }

    /// Id of the todo this event targets, if it targets exactly one.
    pub fn todo_id(&self) -> Option<&str> {
        match self {
            TodoEvent::TodoCreated(e) => Some(&e.id),
            TodoEvent::TodoToggled(e) => Some(&e.id),
            TodoEvent::TodoTextUpdated(e) => Some(&e.id),
            TodoEvent::TodoDeleted(e) => Some(&e.id),
            TodoEvent::AllTodosCompleted(_) | TodoEvent::CompletedTodosCleared => None,
        }
    }

    /// Value-level checks the type system cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let text = match self {
            TodoEvent::TodoCreated(e) => &e.text,
            TodoEvent::TodoTextUpdated(e) => &e.text,
            _ => return Ok(()),
        };
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText { event: self.name() });
        }
        Ok(())
    }

    /// JSON payload with the wire field names.
    pub fn payload(&self) -> Value {
        let mut args = Map::new();
        match self {
            TodoEvent::TodoCreated(e) => {
                args.insert("id".into(), e.id.clone().into());
                args.insert("text".into(), e.text.clone().into());
                args.insert("createdAt".into(), e.created_at.into());
            }
            TodoEvent::TodoToggled(e) => {
                args.insert("id".into(), e.id.clone().into());
                args.insert("completed".into(), e.completed.into());
            }
            TodoEvent::TodoTextUpdated(e) => {
                args.insert("id".into(), e.id.clone().into());
                args.insert("text".into(), e.text.clone().into());
            }
            TodoEvent::TodoDeleted(e) => {
                args.insert("id".into(), e.id.clone().into());
            }
            TodoEvent::AllTodosCompleted(e) => {
                args.insert("completed".into(), e.completed.into());
            }
            TodoEvent::CompletedTodosCleared => {}
        }
        Value::Object(args)
    }

    /// Decode a payload that already passed shape validation.
    pub(crate) fn decode(kind: EventKind, payload: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            EventKind::TodoCreated => TodoEvent::TodoCreated(serde_json::from_value(payload)?),
            EventKind::TodoToggled => TodoEvent::TodoToggled(serde_json::from_value(payload)?),
            EventKind::TodoTextUpdated => {
                TodoEvent::TodoTextUpdated(serde_json::from_value(payload)?)
            }
            EventKind::TodoDeleted => TodoEvent::TodoDeleted(serde_json::from_value(payload)?),
            EventKind::AllTodosCompleted => {
                TodoEvent::AllTodosCompleted(serde_json::from_value(payload)?)
            }
            EventKind::CompletedTodosCleared => TodoEvent::CompletedTodosCleared,
        })
    }

    pub fn to_record(&self, sequence: u64) -> EventRecord {
        EventRecord::new(self.name(), self.payload(), sequence)
    }
}
