//! Materializers: how committed events become rows.
//!
//! Everything here is deterministic. Nothing reads the clock, randomness, or any state other
//! than the snapshot it is handed, so every replica folding the same ordered history arrives
//! at the same table.

mod error;

use tracing::{trace, warn};

use crate::event::TodoEvent;
use crate::snapshot::{RowOp, RowPatch, Snapshot, TodoRow};

pub use error::ConflictError;

/// What to do with a `TodoCreated` whose id already has a live row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Fail the operation with [`ConflictError`]; the snapshot is left untouched.
    #[default]
    Reject,
    /// Keep the existing row and drop the create, for runtimes that may redeliver creates.
    KeepFirst,
}

/// Translate an event into the row operation that materializes it.
pub fn materialize(event: &TodoEvent) -> RowOp {
    match event {
        TodoEvent::TodoCreated(e) => RowOp::Insert {
            row: TodoRow::new(e.id.clone(), e.text.clone(), e.created_at),
        },
        TodoEvent::TodoToggled(e) => RowOp::Update {
            id: e.id.clone(),
            patch: RowPatch::completed(e.completed),
        },
        TodoEvent::TodoTextUpdated(e) => RowOp::Update {
            id: e.id.clone(),
            patch: RowPatch::text(e.text.clone()),
        },
        TodoEvent::TodoDeleted(e) => RowOp::Delete { id: e.id.clone() },
        TodoEvent::AllTodosCompleted(e) => RowOp::UpdateAll {
            patch: RowPatch::completed(e.completed),
        },
        TodoEvent::CompletedTodosCleared => RowOp::DeleteCompleted,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Reducer {
    policy: ConflictPolicy,
}

impl Reducer {
    pub fn new(policy: ConflictPolicy) -> Self {
        Reducer { policy }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// `snapshot` with `event` applied. The input is never modified.
    pub fn apply(&self, snapshot: &Snapshot, event: &TodoEvent) -> Result<Snapshot, ConflictError> {
        let mut next = snapshot.clone();
        self.apply_in_place(&mut next, event)?;
        Ok(next)
    }

    /// Apply `event` to `snapshot` and return the number of rows it changed.
    ///
    /// On error the snapshot is unchanged.
    pub fn apply_in_place(
        &self,
        snapshot: &mut Snapshot,
        event: &TodoEvent,
    ) -> Result<usize, ConflictError> {
        let op = materialize(event);
        let changed = match snapshot.execute(&op) {
            Ok(changed) => changed,
            Err(conflict) if self.policy == ConflictPolicy::KeepFirst => {
                warn!(id = %conflict.id, "duplicate create dropped, keeping first");
                0
            }
            Err(conflict) => return Err(conflict),
        };
        if changed == 0 {
            trace!(event = %event.kind(), "materialized without changing any row");
        }
        Ok(changed)
    }

    /// Fold `events` over the empty snapshot, in order.
    pub fn replay<'a, I>(&self, events: I) -> Result<Snapshot, ConflictError>
    where
        I: IntoIterator<Item = &'a TodoEvent>,
    {
        let mut snapshot = Snapshot::new();
        for event in events {
            self.apply_in_place(&mut snapshot, event)?;
        }
        Ok(snapshot)
    }
}

/// [`Reducer::apply`] with the default [`ConflictPolicy::Reject`].
pub fn apply(snapshot: &Snapshot, event: &TodoEvent) -> Result<Snapshot, ConflictError> {
    Reducer::default().apply(snapshot, event)
}

/// [`Reducer::replay`] with the default [`ConflictPolicy::Reject`].
pub fn replay<'a, I>(events: I) -> Result<Snapshot, ConflictError>
where
    I: IntoIterator<Item = &'a TodoEvent>,
{
    Reducer::default().replay(events)
}
