//! Run summary reporting

use std::fmt;

use serde::Serialize;

use crate::error::RestartResult;
use crate::restart::{ResolveOutcome, RestartedWorkload};

/// Counters for one namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSummary {
    pub namespace: String,
    /// Pods carrying the sidecar marker
    pub pods_matched: usize,
    /// Pods whose owning workload was restarted
    pub triggered: usize,
    /// Pods whose owner chain ended without a restartable workload
    pub skipped: usize,
    pub failed: usize,
    /// Set when the namespace could not be listed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NamespaceSummary {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }

    /// Count the result of one matched pod
    pub fn record(&mut self, result: &RestartResult<ResolveOutcome>) {
        self.pods_matched += 1;
        match result {
            Ok(ResolveOutcome::Restarted(_)) => self.triggered += 1,
            Ok(_) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Counters for the unconditional platform restarts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformSummary {
    pub restarted: usize,
    pub failed: usize,
}

/// Result of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub namespaces: Vec<NamespaceSummary>,
    pub platform: PlatformSummary,
    /// Every restart triggered, in order
    pub restarts: Vec<RestartedWorkload>,
    pub cancelled: bool,
}

impl RunSummary {
    /// Namespaces whose pods could be listed
    pub fn namespaces_processed(&self) -> usize {
        self.namespaces.iter().filter(|ns| ns.error.is_none()).count()
    }

    pub fn pods_triggered(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.triggered).sum()
    }

    pub fn pods_skipped(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.skipped).sum()
    }

    pub fn pods_failed(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.failed).sum()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ns in &self.namespaces {
            match &ns.error {
                Some(error) => writeln!(f, "{}: error: {}", ns.namespace, error)?,
                None => writeln!(
                    f,
                    "{}: {} matched, {} triggered, {} skipped, {} failed",
                    ns.namespace, ns.pods_matched, ns.triggered, ns.skipped, ns.failed
                )?,
            }
        }
        if self.platform.restarted + self.platform.failed > 0 {
            writeln!(
                f,
                "Platform workloads: {} restarted, {} failed",
                self.platform.restarted, self.platform.failed
            )?;
        }
        if self.cancelled {
            writeln!(f, "Run cancelled before completion")?;
        }
        write!(
            f,
            "Processed {} namespaces, triggered restarts for {} pods ({} skipped, {} failed)",
            self.namespaces_processed(),
            self.pods_triggered(),
            self.pods_skipped(),
            self.pods_failed()
        )
    }
}
