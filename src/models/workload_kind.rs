//! Workload kind definitions
//!
//! Centralizes the owner kinds the restart logic understands so the resolver
//! matches on an enum instead of raw strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind name of the intermediate owner that sits between a Deployment and its pods.
pub const REPLICA_SET_KIND: &str = "ReplicaSet";

/// Workload kinds that own a pod template and can be restarted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    Deployment,
    DaemonSet,
    StatefulSet,
}

impl WorkloadKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::StatefulSet => "StatefulSet",
        }
    }

    /// Try to parse an owner reference kind, returning None for anything we can't restart
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Deployment" => Ok(WorkloadKind::Deployment),
            "DaemonSet" => Ok(WorkloadKind::DaemonSet),
            "StatefulSet" => Ok(WorkloadKind::StatefulSet),
            _ => Err(format!("Unsupported workload kind: {}", s)),
        }
    }
}
