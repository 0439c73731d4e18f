use std::fmt;

use serde::Serialize;

use super::record::WorkloadRecord;

/// Policy-application mode derived from `enforcement_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PolicyMode {
    Idle,
    Visibility,
    Enforced,
    /// Any mode the PCE reports that is not one of the three above.
    Active,
}

impl PolicyMode {
    fn from_enforcement(enforcement: &str) -> Self {
        match enforcement {
            "idle" => PolicyMode::Idle,
            "visibility_only" => PolicyMode::Visibility,
            "full" => PolicyMode::Enforced,
            _ => PolicyMode::Active,
        }
    }
}

impl fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyMode::Idle => write!(f, "idle"),
            PolicyMode::Visibility => write!(f, "visibility"),
            PolicyMode::Enforced => write!(f, "enforced"),
            PolicyMode::Active => write!(f, "active"),
        }
    }
}

/// Composite lifecycle state of a workload.
///
/// Offline, unmanaged and uninstalled are terminal: when one applies, the
/// enforcement mode and sync state are not consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LifecycleState {
    Offline,
    Unmanaged,
    Uninstalled,
    Mode { mode: PolicyMode, syncing: bool },
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Offline => write!(f, "offline"),
            LifecycleState::Unmanaged => write!(f, "unmanaged"),
            LifecycleState::Uninstalled => write!(f, "uninstalled"),
            LifecycleState::Mode { mode, syncing: false } => write!(f, "{mode}"),
            LifecycleState::Mode { mode, syncing: true } => write!(f, "{mode}/syncing"),
        }
    }
}

/// Connectivity of the on-host agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgentStatus {
    Offline,
    Uninstalled,
    Stopped,
    Active { syncing: bool },
    Unknown,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Offline => write!(f, "offline"),
            AgentStatus::Uninstalled => write!(f, "uninstalled"),
            AgentStatus::Stopped => write!(f, "stopped"),
            AgentStatus::Active { syncing: false } => write!(f, "active"),
            AgentStatus::Active { syncing: true } => write!(f, "active/syncing"),
            AgentStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classify the lifecycle state of a workload.
///
/// Rules are checked in order and the first terminal one wins: offline,
/// unmanaged, uninstalled agent. Otherwise the enforcement mode decides,
/// with `/syncing` appended while the agent is syncing its configuration.
pub fn classify_lifecycle_state(record: &WorkloadRecord) -> LifecycleState {
    if !record.is_online() {
        return LifecycleState::Offline;
    }
    if record.is_unmanaged() {
        return LifecycleState::Unmanaged;
    }
    if record.agent_status() == "uninstalled" {
        return LifecycleState::Uninstalled;
    }

    let mode = PolicyMode::from_enforcement(&record.enforcement_mode());
    let syncing = record.config_sync_state() == "syncing";
    LifecycleState::Mode { mode, syncing }
}

/// Classify the agent connectivity status of a workload.
pub fn classify_agent_status(record: &WorkloadRecord) -> AgentStatus {
    if !record.is_online() {
        return AgentStatus::Offline;
    }

    match record.agent_status().as_str() {
        "uninstalled" => AgentStatus::Uninstalled,
        "stopped" => AgentStatus::Stopped,
        "running" | "active" => AgentStatus::Active {
            syncing: record.config_sync_state() == "syncing",
        },
        _ => AgentStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn record(v: Value) -> WorkloadRecord {
        WorkloadRecord::try_from(v).unwrap()
    }

    fn lifecycle(v: Value) -> String {
        classify_lifecycle_state(&record(v)).to_string()
    }

    fn agent(v: Value) -> String {
        classify_agent_status(&record(v)).to_string()
    }

    #[test]
    fn offline_wins_over_everything() {
        let samples = [
            json!({"online": false}),
            json!({"online": false, "managed": false}),
            json!({
                "online": false,
                "agent": {"status": "uninstalled", "config_sync_state": "syncing"},
                "enforcement_mode": "full"
            }),
            json!({"managed": true, "agent": {"status": {"status": "running"}}}),
        ];
        for s in samples {
            assert_eq!(lifecycle(s.clone()), "offline", "{s}");
            assert_eq!(agent(s.clone()), "offline", "{s}");
        }
    }

    #[test]
    fn unmanaged_when_online_and_not_managed() {
        let v = json!({
            "online": true,
            "managed": false,
            "agent": {"status": "uninstalled"},
            "enforcement_mode": "full"
        });
        assert_eq!(lifecycle(v), "unmanaged");
    }

    #[test]
    fn uninstalled_agent_short_circuits_mode() {
        let v = json!({
            "online": true,
            "agent": {"status": {"status": "Uninstalled"}, "config_sync_state": "syncing"},
            "enforcement_mode": "full"
        });
        assert_eq!(lifecycle(v.clone()), "uninstalled");
        assert_eq!(agent(v), "uninstalled");
    }

    #[test]
    fn enforcement_modes_map_to_labels() {
        let cases = [
            ("idle", "idle"),
            ("visibility_only", "visibility"),
            ("full", "enforced"),
            ("FULL", "enforced"),
            ("selective", "active"),
        ];
        for (mode, expected) in cases {
            let v = json!({"online": true, "enforcement_mode": mode});
            assert_eq!(lifecycle(v), expected, "mode {mode}");
        }
        assert_eq!(lifecycle(json!({"online": true})), "active");
    }

    #[test]
    fn enforced_syncing_suffix() {
        let v = json!({
            "online": true,
            "enforcement_mode": "full",
            "agent": {"status": "running", "config_sync_state": "syncing"}
        });
        assert_eq!(lifecycle(v), "enforced/syncing");
    }

    #[test]
    fn nested_mode_equals_flat_mode() {
        let flat = json!({"online": true, "enforcement_mode": "idle"});
        let nested = json!({"online": true, "enforcement_mode": {"name": "idle"}});
        assert_eq!(lifecycle(flat), lifecycle(nested.clone()));
        assert_eq!(lifecycle(nested), "idle");
    }

    #[test]
    fn running_agent_reports_syncing() {
        let syncing = json!({
            "online": true,
            "agent": {"status": "running", "config_sync_state": "syncing"}
        });
        assert_eq!(agent(syncing), "active/syncing");

        for sync in ["applied", "staged", "unknown"] {
            let v = json!({
                "online": true,
                "agent": {"status": {"status": "running"}, "config_sync_state": sync}
            });
            assert_eq!(agent(v), "active", "sync {sync}");
        }
        let v = json!({"online": true, "agent": {"status": "active"}});
        assert_eq!(agent(v), "active");
    }

    #[test]
    fn other_agent_statuses() {
        assert_eq!(agent(json!({"online": true, "agent": {"status": "stopped"}})), "stopped");
        assert_eq!(agent(json!({"online": true, "agent": {"status": "suspended"}})), "unknown");
        assert_eq!(agent(json!({"online": true})), "unknown");
    }
}
