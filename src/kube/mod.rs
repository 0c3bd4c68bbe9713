//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and exposes the narrow
//! [`ClusterApi`] seam the restart logic talks to.

mod cluster;

pub use cluster::{ClusterApi, KubeCluster};
#[cfg(test)]
pub use cluster::MockClusterApi;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;

/// Initialize and return a Kubernetes client
///
/// Without overrides this uses the default loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
///
/// An explicit kubeconfig path and/or context name bypasses inference.
pub async fn create_client(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .context("Failed to build client config from kubeconfig")?
        }
        None if context.is_some() => Config::from_kubeconfig(&options)
            .await
            .context("Failed to build client config for context")?,
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes client config")?,
    };

    tracing::debug!("Connecting to cluster at {}", config.cluster_url);
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Get the name of the kubeconfig context that will be used
///
/// Returns "in-cluster" when no kubeconfig can be read.
pub fn context_name(kubeconfig: Option<&Path>, context: Option<&str>) -> String {
    if let Some(context) = context {
        return context.to_string();
    }

    let loaded = match kubeconfig {
        Some(path) => Kubeconfig::read_from(path),
        None => Kubeconfig::read(),
    };

    loaded
        .ok()
        .and_then(|k| k.current_context)
        .unwrap_or_else(|| "in-cluster".to_string())
}
