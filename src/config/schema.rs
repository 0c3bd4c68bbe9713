//! Configuration schema definitions
//!
//! Defines the structure of the configuration file using serde for serialization.

use serde::{Deserialize, Serialize};

use crate::models::WorkloadKind;
use crate::restart::{
    DEFAULT_CONFLICT_RETRIES, DEFAULT_MAX_OWNER_DEPTH, DEFAULT_SIDECAR_INIT_CONTAINERS,
    ResolverOptions,
};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Init container names that mark a pod as sidecar-injected
    #[serde(default = "default_sidecar_init_containers")]
    pub sidecar_init_containers: Vec<String>,

    /// Namespaces left alone by --all-namespaces
    #[serde(default = "default_skip_namespaces")]
    pub skip_namespaces: Vec<String>,

    /// Workloads restarted on every run regardless of their pods
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platform_workloads: Vec<PlatformWorkload>,

    /// Owner references followed from a pod before giving up
    #[serde(default = "default_max_owner_depth")]
    pub max_owner_depth: usize,

    /// Re-fetch attempts after an update conflict
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
}

/// A mesh control-plane workload restarted unconditionally
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformWorkload {
    pub kind: WorkloadKind,
    pub name: String,
    #[serde(default = "default_platform_namespace")]
    pub namespace: String,
}

impl Config {
    /// Resolver tunables taken from this configuration
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            max_owner_depth: self.max_owner_depth,
            conflict_retries: self.conflict_retries,
        }
    }
}

// Default value functions
fn default_sidecar_init_containers() -> Vec<String> {
    DEFAULT_SIDECAR_INIT_CONTAINERS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_skip_namespaces() -> Vec<String> {
    ["kube-system", "kube-public", "kube-node-lease", "istio-system"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_platform_namespace() -> String {
    "istio-system".to_string()
}

fn default_max_owner_depth() -> usize {
    DEFAULT_MAX_OWNER_DEPTH
}

fn default_conflict_retries() -> u32 {
    DEFAULT_CONFLICT_RETRIES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sidecar_init_containers: default_sidecar_init_containers(),
            skip_namespaces: default_skip_namespaces(),
            platform_workloads: Vec::new(),
            max_owner_depth: default_max_owner_depth(),
            conflict_retries: default_conflict_retries(),
        }
    }
}
