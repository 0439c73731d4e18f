use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::classify::{AgentStatus, LifecycleState, classify_agent_status, classify_lifecycle_state};
use super::fields::{FieldShape, NOT_AVAILABLE, display_text};
use super::record::{WorkloadRecord, json_kind};

/// Why a single workload could not be turned into a report row.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("workload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),

    #[error("field `{field}` is a JSON {found}")]
    MalformedField {
        field: &'static str,
        found: &'static str,
    },

    #[error("interfaces[{index}] is a JSON {found}, expected an object")]
    MalformedInterface { index: usize, found: &'static str },
}

/// Report projection of one workload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRow {
    pub hostname: String,
    pub ip: String,
    pub state: LifecycleState,
    pub agent_status: AgentStatus,
    pub policy_sync: String,
    pub mode: String,
    pub status: String,
    pub version: String,
    pub health_errors: String,
    pub managed_since: String,
}

impl ClassifiedRow {
    pub fn from_record(record: &WorkloadRecord) -> Result<Self, RowError> {
        let hostname = match record.get("hostname") {
            None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(RowError::MalformedField {
                    field: "hostname",
                    found: json_kind(other),
                });
            }
        };

        // A non-object agent would make every agent column meaningless.
        if let Some(agent) = record.get("agent")
            && !matches!(agent, Value::Object(_) | Value::Null)
        {
            return Err(RowError::MalformedField {
                field: "agent",
                found: json_kind(agent),
            });
        }

        let ip = primary_ip(record.get("interfaces"))?;
        let agent_status_field = record.agent_status_field();
        let status_details = agent_status_field.as_nested();

        let policy_sync = match status_details.and_then(|s| s.get("security_policy_sync_state")) {
            Some(Value::String(s)) => s.to_lowercase(),
            other => display_text(other),
        };

        let mode = match record.enforcement_mode_field() {
            FieldShape::Nested(map) => display_text(map.get("name")),
            _ => display_text(record.get("enforcement_mode")),
        };

        let status = match agent_status_field {
            FieldShape::Nested(map) => display_text(map.get("status")),
            _ => display_text(record.agent().and_then(|a| a.get("status"))),
        };

        let version = display_text(status_details.and_then(|s| s.get("agent_version")));
        let health_errors = condense_health_errors(status_details);
        let managed_since = managed_since(record.get("created_at"));

        Ok(Self {
            hostname,
            ip,
            state: classify_lifecycle_state(record),
            agent_status: classify_agent_status(record),
            policy_sync,
            mode,
            status,
            version,
            health_errors,
            managed_since,
        })
    }

    /// Cells in report column order.
    pub fn cells(&self) -> [String; 10] {
        [
            self.hostname.clone(),
            self.ip.clone(),
            self.state.to_string(),
            self.agent_status.to_string(),
            self.policy_sync.clone(),
            self.mode.clone(),
            self.status.clone(),
            self.version.clone(),
            self.health_errors.clone(),
            self.managed_since.clone(),
        ]
    }
}

/// First interface address that is a non-empty string.
///
/// Entries are inspected in order and the scan stops at the first hit, so a
/// malformed entry after it is never looked at. Null entries are skipped.
fn primary_ip(interfaces: Option<&Value>) -> Result<String, RowError> {
    let entries = match interfaces {
        None | Some(Value::Null) => return Ok(NOT_AVAILABLE.to_string()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(RowError::MalformedField {
                field: "interfaces",
                found: json_kind(other),
            });
        }
    };

    for (index, entry) in entries.iter().enumerate() {
        match entry {
            Value::Null => continue,
            Value::Object(iface) => {
                if let Some(Value::String(address)) = iface.get("address")
                    && !address.is_empty()
                {
                    return Ok(address.clone());
                }
            }
            other => {
                return Err(RowError::MalformedInterface {
                    index,
                    found: json_kind(other),
                });
            }
        }
    }

    Ok(NOT_AVAILABLE.to_string())
}

/// Errors and warnings joined with commas, `None` when the agent reports an
/// empty health object.
fn condense_health_errors(status_details: Option<&Map<String, Value>>) -> String {
    let health = status_details.and_then(|s| s.get("agent_health_errors"));
    let Some(Value::Object(health)) = health else {
        return display_text(health);
    };

    let entries: Vec<String> = ["errors", "warnings"]
        .iter()
        .filter_map(|key| health.get(*key).and_then(Value::as_array))
        .flatten()
        .map(|e| display_text(Some(e)))
        .collect();

    if entries.is_empty() {
        "None".to_string()
    } else {
        entries.join(",")
    }
}

/// `created_at` as a local `YYYY-MM-DD` date.
///
/// Accepts epoch seconds (integer, float or numeric string) and RFC 3339
/// strings; other strings are passed through untouched.
fn managed_since(created_at: Option<&Value>) -> String {
    let seconds = match created_at {
        None | Some(Value::Null) => return NOT_AVAILABLE.to_string(),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => {
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return ts.with_timezone(&Local).format("%Y-%m-%d").to_string();
            }
            match s.trim().parse::<i64>() {
                Ok(secs) => Some(secs),
                Err(_) => return s.clone(),
            }
        }
        Some(other) => return other.to_string(),
    };

    seconds
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| display_text(created_at))
}
