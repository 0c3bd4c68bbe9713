//! Data structures for resolution results

use serde::Serialize;

use crate::models::WorkloadKind;

/// Workload whose pod template was marked for restart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestartedWorkload {
    pub kind: WorkloadKind,
    pub namespace: String,
    pub name: String,
    /// Value written to the restart annotation
    pub restarted_at: String,
}

/// How an owner chain ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// A workload was found and its pod template annotated
    Restarted(RestartedWorkload),
    /// The chain ended at an object with no owner (e.g. a bare ReplicaSet)
    Unowned { kind: String, name: String },
    /// The chain reached a kind that can't be restarted, nothing was touched
    Unsupported { kind: String, name: String },
}

impl ResolveOutcome {
    pub fn restarted(&self) -> Option<&RestartedWorkload> {
        match self {
            ResolveOutcome::Restarted(workload) => Some(workload),
            _ => None,
        }
    }
}
