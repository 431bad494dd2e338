use std::collections::HashMap;

use serde_json::Value;

use super::error::{SchemaError, ValidationError};
use super::shape::PayloadShape;
use crate::event::{EventKind, EventName, EventRecord, TodoEvent};

/// One registered event kind: its versioned name and required payload shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventDefinition {
    pub name: EventName,
    pub shape: PayloadShape,
}

impl EventDefinition {
    pub fn kind(&self) -> EventKind {
        self.name.kind
    }

    pub fn wire_name(&self) -> String {
        self.name.to_string()
    }
}

/// The closed set of events a store accepts, keyed by wire name.
#[derive(Clone, Debug, Default)]
pub struct EventRegistry {
    definitions: HashMap<String, EventDefinition>,
}

impl EventRegistry {
    /// An empty registry. Use [`EventRegistry::todos`] for the standard schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every todo event kind at the current schema version.
    pub fn todos() -> Result<Self, SchemaError> {
        let mut registry = EventRegistry::new();
        for kind in EventKind::ALL {
            registry.register(&kind.wire_name(), kind.shape())?;
        }
        Ok(registry)
    }

    /// Declare one event kind.
    ///
    /// The name must parse as `v<version>.<Kind>` for a kind the reducer can materialize,
    /// and must not already be registered.
    pub fn register(
        &mut self,
        name: &str,
        shape: PayloadShape,
    ) -> Result<EventDefinition, SchemaError> {
        let parsed =
            EventName::parse(name).ok_or_else(|| SchemaError::InvalidName(name.to_string()))?;
        if self.definitions.contains_key(name) {
            return Err(SchemaError::DuplicateEvent(name.to_string()));
        }

        let definition = EventDefinition {
            name: parsed,
            shape,
        };
        self.definitions
            .insert(name.to_string(), definition.clone());
        Ok(definition)
    }

    pub fn get(&self, name: &str) -> Option<&EventDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Registered wire names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validate `payload` against the shape registered for `name` and build the typed event.
    pub fn construct(&self, name: &str, payload: &Value) -> Result<TodoEvent, ValidationError> {
        let definition = self
            .get(name)
            .ok_or_else(|| ValidationError::UnknownEvent {
                name: name.to_string(),
            })?;

        let conformed = definition.shape.conform(name, payload)?;
        let event = TodoEvent::decode(definition.kind(), conformed).map_err(|e| {
            ValidationError::Decode {
                event: name.to_string(),
                message: e.to_string(),
            }
        })?;
        event.validate()?;
        Ok(event)
    }

    /// Validate a record arriving from outside the process.
    pub fn decode(&self, record: &EventRecord) -> Result<TodoEvent, ValidationError> {
        self.construct(&record.name, &record.args)
    }
}
