use thiserror::Error;

use crate::reducer::ConflictError;
use crate::schema::{SchemaError, ValidationError};
use crate::snapshot::CheckpointError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("history sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    #[error("store is shut down")]
    Closed,

    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("failed to encode change notification: {0}")]
    Notify(String),
}
