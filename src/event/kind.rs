use std::fmt;
use std::str::FromStr;

use crate::schema::{FieldType, PayloadShape};

/// Version prefix stamped on every wire name this crate produces (`"v1.TodoCreated"`).
pub const SCHEMA_VERSION: u32 = 1;

/// The closed set of event kinds that may change todo state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    TodoCreated,
    TodoToggled,
    TodoTextUpdated,
    TodoDeleted,
    AllTodosCompleted,
    CompletedTodosCleared,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::TodoCreated,
        EventKind::TodoToggled,
        EventKind::TodoTextUpdated,
        EventKind::TodoDeleted,
        EventKind::AllTodosCompleted,
        EventKind::CompletedTodosCleared,
    ];

    /// Bare kind name, without the version prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TodoCreated => "TodoCreated",
            EventKind::TodoToggled => "TodoToggled",
            EventKind::TodoTextUpdated => "TodoTextUpdated",
            EventKind::TodoDeleted => "TodoDeleted",
            EventKind::AllTodosCompleted => "AllTodosCompleted",
            EventKind::CompletedTodosCleared => "CompletedTodosCleared",
        }
    }

    /// Wire name at the current schema version.
    pub fn wire_name(&self) -> String {
        EventName::current(*self).to_string()
    }

    /// Required payload fields for this kind.
    pub fn shape(&self) -> PayloadShape {
        match self {
            EventKind::TodoCreated => PayloadShape::new()
                .field("id", FieldType::String)
                .field("text", FieldType::String)
                .field("createdAt", FieldType::Integer),
            EventKind::TodoToggled => PayloadShape::new()
                .field("id", FieldType::String)
                .field("completed", FieldType::Boolean),
            EventKind::TodoTextUpdated => PayloadShape::new()
                .field("id", FieldType::String)
                .field("text", FieldType::String),
            EventKind::TodoDeleted => PayloadShape::new().field("id", FieldType::String),
            EventKind::AllTodosCompleted => {
                PayloadShape::new().field("completed", FieldType::Boolean)
            }
            EventKind::CompletedTodosCleared => PayloadShape::new(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// A parsed, version-namespaced event name such as `v1.TodoToggled`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventName {
    pub version: u32,
    pub kind: EventKind,
}

impl EventName {
    pub fn new(version: u32, kind: EventKind) -> Self {
        EventName { version, kind }
    }

    pub fn current(kind: EventKind) -> Self {
        EventName::new(SCHEMA_VERSION, kind)
    }

    /// Parse `v<version>.<Kind>`. Returns `None` for anything else, including
    /// non-canonical versions such as `v01`.
    pub fn parse(name: &str) -> Option<Self> {
        let (prefix, kind) = name.split_once('.')?;
        let digits = prefix.strip_prefix('v')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        let version = digits.parse().ok()?;
        let kind = kind.parse().ok()?;
        Some(EventName { version, kind })
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.version, self.kind)
    }
}
