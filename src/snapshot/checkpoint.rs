use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::row::TodoRow;
use super::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointError {
    #[error("failed to encode checkpoint: {0}")]
    Encode(String),
    #[error("failed to decode checkpoint: {0}")]
    Decode(String),
}

/// A snapshot frozen at a history position, so recovery can skip replaying the events
/// at or below `sequence`.
///
/// Rows are bitcode-encoded; in JSON the bytes travel as base64.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub sequence: u64,
    #[serde(with = "rows_serde")]
    pub rows: Vec<u8>,
}

mod rows_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(rows: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        STANDARD.encode(rows).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

impl Checkpoint {
    pub fn capture(snapshot: &Snapshot, sequence: u64) -> Result<Self, CheckpointError> {
        let rows: Vec<&TodoRow> = snapshot.rows().collect();
        let rows =
            bitcode::serialize(&rows).map_err(|e| CheckpointError::Encode(e.to_string()))?;
        Ok(Checkpoint { sequence, rows })
    }

    pub fn snapshot(&self) -> Result<Snapshot, CheckpointError> {
        let rows: Vec<TodoRow> =
            bitcode::deserialize(&self.rows).map_err(|e| CheckpointError::Decode(e.to_string()))?;
        Ok(Snapshot::from_rows(rows))
    }
}
