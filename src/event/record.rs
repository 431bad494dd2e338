use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An event as it crosses the sync boundary: wire name, untyped JSON args, commit position.
///
/// Records are untrusted until they pass [`EventRegistry::decode`](crate::EventRegistry::decode).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct EventRecord {
    pub name: String,
    #[serde(default)]
    pub args: Value,
    pub sequence: u64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl EventRecord {
    pub fn new(name: impl Into<String>, args: Value, sequence: u64) -> Self {
        EventRecord {
            name: name.into(),
            args,
            sequence,
            metadata: HashMap::new(),
        }
    }

    /// Create an event record with metadata.
    pub fn with_metadata(
        name: impl Into<String>,
        args: Value,
        sequence: u64,
        metadata: HashMap<String, String>,
    ) -> Self {
        EventRecord {
            name: name.into(),
            args,
            sequence,
            metadata,
        }
    }

    /// Get a metadata value by key.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|s| s.as_str())
    }

    /// Id of the replica that produced the event, if recorded.
    pub fn client_id(&self) -> Option<&str> {
        self.meta("client_id")
    }
}
