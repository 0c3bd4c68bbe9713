//! Namespace selection

use crate::error::{RestartError, RestartResult};

/// Which namespaces a run scans
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceSelection {
    /// Exactly one namespace
    Single(String),
    /// Every namespace except the configured skip list
    All,
}

impl NamespaceSelection {
    /// Build the selection from `--namespace` / `--all-namespaces`
    ///
    /// Exactly one of the two must be given.
    pub fn from_flags(namespace: Option<&str>, all_namespaces: bool) -> RestartResult<Self> {
        match (namespace, all_namespaces) {
            (Some(_), true) => Err(RestartError::Config(
                "--namespace and --all-namespaces are mutually exclusive".to_string(),
            )),
            (Some(ns), false) if ns.trim().is_empty() => Err(RestartError::Config(
                "--namespace must not be empty".to_string(),
            )),
            (Some(ns), false) => Ok(NamespaceSelection::Single(ns.trim().to_string())),
            (None, true) => Ok(NamespaceSelection::All),
            (None, false) => Err(RestartError::Config(
                "either --namespace or --all-namespaces is required".to_string(),
            )),
        }
    }
}

/// Drop skipped namespaces, keeping the listing order
pub fn without_skipped(namespaces: Vec<String>, skip: &[String]) -> Vec<String> {
    namespaces
        .into_iter()
        .filter(|ns| !skip.iter().any(|s| s == ns))
        .collect()
}
