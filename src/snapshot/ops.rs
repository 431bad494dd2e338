use serde::{Deserialize, Serialize};

use super::row::TodoRow;

/// Column changes for an update. `None` leaves the column as it is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

impl RowPatch {
    pub fn text(text: impl Into<String>) -> Self {
        RowPatch {
            text: Some(text.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        RowPatch {
            text: None,
            completed: Some(completed),
        }
    }

    /// Apply to `row`; returns whether any column changed.
    pub(crate) fn apply_to(&self, row: &mut TodoRow) -> bool {
        let mut changed = false;
        if let Some(text) = &self.text {
            if row.text != *text {
                row.text.clone_from(text);
                changed = true;
            }
        }
        if let Some(completed) = self.completed {
            if row.completed != completed {
                row.completed = completed;
                changed = true;
            }
        }
        changed
    }
}

/// A structured row-level operation against the todos table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RowOp {
    Insert { row: TodoRow },
    Update { id: String, patch: RowPatch },
    UpdateAll { patch: RowPatch },
    Delete { id: String },
    /// Delete every row whose `completed` is true.
    DeleteCompleted,
}
