//! Event schema registry: which events exist and what their payloads must look like.
//!
//! Typed events built in Rust are checked by the compiler. This module is the runtime check
//! for events that arrive as untyped JSON from outside the process.

mod error;
mod registry;
mod shape;

pub use error::{SchemaError, ValidationError};
pub use registry::{EventDefinition, EventRegistry};
pub use shape::{FieldSpec, FieldType, PayloadShape};
