//! Shape-tolerant access to workload JSON fields.
//!
//! The PCE reports several fields either as a plain string or as a nested
//! object (`agent.status`, `enforcement_mode`). [`FieldShape`] tags which of
//! the two (or neither) a value is, so callers resolve it with one `match`
//! instead of probing the JSON by hand.

use serde_json::{Map, Value};

/// Placeholder rendered for fields the record does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

/// The observed shape of an optional JSON field.
#[derive(Debug, Clone, Copy)]
pub enum FieldShape<'a> {
    Text(&'a str),
    Nested(&'a Map<String, Value>),
    Other,
    Absent,
}

impl<'a> FieldShape<'a> {
    pub fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => FieldShape::Absent,
            Some(Value::String(s)) => FieldShape::Text(s),
            Some(Value::Object(map)) => FieldShape::Nested(map),
            Some(_) => FieldShape::Other,
        }
    }

    /// Lower-cased label: the text itself, or the string under `key` of a
    /// nested object. Anything else yields `default`.
    pub fn resolve(&self, key: &str, default: &str) -> String {
        match self {
            FieldShape::Text(s) => s.to_lowercase(),
            FieldShape::Nested(map) => match map.get(key) {
                Some(Value::String(s)) => s.to_lowercase(),
                _ => default.to_string(),
            },
            FieldShape::Other | FieldShape::Absent => default.to_string(),
        }
    }

    pub fn as_nested(&self) -> Option<&'a Map<String, Value>> {
        match *self {
            FieldShape::Nested(map) => Some(map),
            _ => None,
        }
    }
}

/// Text of a scalar for display: strings verbatim, missing or null as
/// `N/A`, everything else as compact JSON.
pub fn display_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
