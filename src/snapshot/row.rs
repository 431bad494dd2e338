use serde::{Deserialize, Serialize};

/// Name of the materialized table.
pub const TABLE: &str = "todos";

/// Column names of the materialized table, in declaration order.
pub const COLUMNS: [&str; 4] = ["id", "text", "completed", "createdAt"];

/// One live todo.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoRow {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl TodoRow {
    pub fn new(id: impl Into<String>, text: impl Into<String>, created_at: i64) -> Self {
        TodoRow {
            id: id.into(),
            text: text.into(),
            completed: false,
            created_at,
        }
    }
}
