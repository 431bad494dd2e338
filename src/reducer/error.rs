use thiserror::Error;

/// A `TodoCreated` for an id that already has a live row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("todo {id:?} already exists")]
pub struct ConflictError {
    pub id: String,
}
