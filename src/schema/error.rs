use thiserror::Error;

use super::shape::FieldType;

/// An event payload that does not satisfy its registered shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown event {name:?}")]
    UnknownEvent { name: String },

    #[error("{event}: payload must be an object, got {found}")]
    NotAnObject { event: String, found: &'static str },

    #[error("{event}: missing required field {field:?}")]
    MissingField { event: String, field: String },

    #[error("{event}: field {field:?} must be {expected}, got {found}")]
    TypeMismatch {
        event: String,
        field: String,
        expected: FieldType,
        found: &'static str,
    },

    #[error("{event}: text must not be empty")]
    EmptyText { event: String },

    #[error("{event}: {message}")]
    Decode { event: String, message: String },
}

/// A registry that cannot be built. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("event {0:?} is already registered")]
    DuplicateEvent(String),

    #[error("event name {0:?} is not of the form v<version>.<Kind> with a known kind")]
    InvalidName(String),
}
