//! The materialized todos table.
//!
//! A [`Snapshot`] is a pure projection of the event history: it only changes through
//! [`Snapshot::execute`], which the reducer drives with the row operations it materializes.

mod checkpoint;
mod ops;
mod row;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reducer::ConflictError;

pub use checkpoint::{Checkpoint, CheckpointError};
pub use ops::{RowOp, RowPatch};
pub use row::{TodoRow, COLUMNS, TABLE};

/// All live todo rows, keyed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    todos: BTreeMap<String, TodoRow>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&TodoRow> {
        self.todos.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.todos.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Rows in id order.
    pub fn rows(&self) -> impl Iterator<Item = &TodoRow> {
        self.todos.values()
    }

    pub(crate) fn from_rows(rows: impl IntoIterator<Item = TodoRow>) -> Self {
        Snapshot {
            todos: rows.into_iter().map(|row| (row.id.clone(), row)).collect(),
        }
    }

    /// Run one row operation. Returns the number of rows it changed.
    ///
    /// Only an insert over an existing id can fail, and it leaves the table untouched.
    pub fn execute(&mut self, op: &RowOp) -> Result<usize, ConflictError> {
        match op {
            RowOp::Insert { row } => {
                if self.todos.contains_key(&row.id) {
                    return Err(ConflictError { id: row.id.clone() });
                }
                self.todos.insert(row.id.clone(), row.clone());
                Ok(1)
            }
            RowOp::Update { id, patch } => Ok(self
                .todos
                .get_mut(id)
                .map_or(0, |row| usize::from(patch.apply_to(row)))),
            RowOp::UpdateAll { patch } => Ok(self
                .todos
                .values_mut()
                .map(|row| patch.apply_to(row))
                .filter(|changed| *changed)
                .count()),
            RowOp::Delete { id } => Ok(usize::from(self.todos.remove(id).is_some())),
            RowOp::DeleteCompleted => {
                let before = self.todos.len();
                self.todos.retain(|_, row| !row.completed);
                Ok(before - self.todos.len())
            }
        }
    }
}
