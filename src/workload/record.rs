use serde_json::{Map, Value};

use super::fields::FieldShape;
use super::row::RowError;

/// One workload as returned by the inventory endpoint.
///
/// The record is kept as raw JSON: the PCE does not use the same shape for
/// every host, so fields are read on demand through [`FieldShape`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadRecord {
    fields: Map<String, Value>,
}

impl TryFrom<Value> for WorkloadRecord {
    type Error = RowError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(RowError::NotAnObject(json_kind(&other))),
        }
    }
}

impl WorkloadRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Only an explicit `true` counts as online.
    pub fn is_online(&self) -> bool {
        matches!(self.get("online"), Some(Value::Bool(true)))
    }

    /// Unmanaged only when the flag is present and `false`.
    pub fn is_unmanaged(&self) -> bool {
        matches!(self.get("managed"), Some(Value::Bool(false)))
    }

    /// The agent object, if the record carries one.
    pub fn agent(&self) -> Option<&Map<String, Value>> {
        self.get("agent").and_then(Value::as_object)
    }

    /// `agent.status` as its observed shape.
    pub fn agent_status_field(&self) -> FieldShape<'_> {
        FieldShape::of(self.agent().and_then(|a| a.get("status")))
    }

    pub fn agent_status(&self) -> String {
        self.agent_status_field().resolve("status", "unknown")
    }

    pub fn enforcement_mode_field(&self) -> FieldShape<'_> {
        FieldShape::of(self.get("enforcement_mode"))
    }

    pub fn enforcement_mode(&self) -> String {
        self.enforcement_mode_field().resolve("name", "unknown")
    }

    pub fn config_sync_state(&self) -> String {
        match self.agent().and_then(|a| a.get("config_sync_state")) {
            Some(Value::String(s)) => s.to_lowercase(),
            _ => "unknown".to_string(),
        }
    }

    /// Best label for diagnostics: hostname, then href.
    pub fn identifier(&self) -> Option<&str> {
        ["hostname", "href"]
            .iter()
            .find_map(|key| {
                self.get(key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            })
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
