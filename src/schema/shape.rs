use std::fmt;

use serde_json::{Map, Number, Value};

use super::error::ValidationError;

/// Largest integer a JSON producer using IEEE doubles can represent exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Primitive type of a payload field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Number,
    /// A number with no fractional part. Whole-valued floats are accepted and normalized.
    Integer,
    Boolean,
}

impl FieldType {
    fn conform(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (FieldType::String, Value::String(_))
            | (FieldType::Number, Value::Number(_))
            | (FieldType::Boolean, Value::Bool(_)) => Some(value.clone()),
            (FieldType::Integer, Value::Number(n)) => integer(n).map(Value::from),
            _ => None,
        }
    }
}

fn integer(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        Some(f as i64)
    } else {
        None
    }
}

/// JSON type name used in error messages.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
}

/// The required fields of an event payload. Every field is required; there are no optionals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PayloadShape {
    fields: Vec<FieldSpec>,
}

impl PayloadShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check `payload` against the shape and return it reduced to the declared fields.
    ///
    /// A `null` payload is read as an empty object. Undeclared fields are dropped.
    pub fn conform(&self, event: &str, payload: &Value) -> Result<Value, ValidationError> {
        let empty = Map::new();
        let object = match payload {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(ValidationError::NotAnObject {
                    event: event.to_string(),
                    found: json_type(other),
                })
            }
        };

        let mut conformed = Map::with_capacity(self.fields.len());
        for spec in &self.fields {
            let value = object
                .get(&spec.name)
                .ok_or_else(|| ValidationError::MissingField {
                    event: event.to_string(),
                    field: spec.name.clone(),
                })?;
            let value = spec
                .ty
                .conform(value)
                .ok_or_else(|| ValidationError::TypeMismatch {
                    event: event.to_string(),
                    field: spec.name.clone(),
                    expected: spec.ty,
                    found: json_type(value),
                })?;
            conformed.insert(spec.name.clone(), value);
        }
        Ok(Value::Object(conformed))
    }
}
