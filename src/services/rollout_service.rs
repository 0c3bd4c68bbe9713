//! Rollout service
//!
//! Drives a restart run: platform workloads first, then every sidecar-injected
//! pod in the selected namespaces, one pod at a time.

use std::sync::Arc;

use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, PlatformWorkload};
use crate::error::{ApiAction, RestartError, RestartResult};
use crate::kube::ClusterApi;
use crate::restart::{
    Clock, DEFAULT_SIDECAR_INIT_CONTAINERS, OwnerResolver, ResolveOutcome, ResolverOptions,
    RestartedWorkload, SystemClock, has_sidecar_marker_with,
};
use crate::services::namespaces::{NamespaceSelection, without_skipped};
use crate::services::summary::{NamespaceSummary, PlatformSummary, RunSummary};

/// Service that restarts sidecar-injected workloads
pub struct RolloutService {
    cluster: Arc<dyn ClusterApi>,
    clock: Arc<dyn Clock>,
    sidecar_init_containers: Vec<String>,
    skip_namespaces: Vec<String>,
    options: ResolverOptions,
}

impl RolloutService {
    pub fn new(cluster: Arc<dyn ClusterApi>) -> Self {
        Self {
            cluster,
            clock: Arc::new(SystemClock),
            sidecar_init_containers: DEFAULT_SIDECAR_INIT_CONTAINERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            skip_namespaces: Vec::new(),
            options: ResolverOptions::default(),
        }
    }

    /// Build a service using the marker names, skip list and tunables from `config`
    pub fn from_config(cluster: Arc<dyn ClusterApi>, config: &Config) -> Self {
        Self::new(cluster)
            .with_sidecar_init_containers(config.sidecar_init_containers.clone())
            .with_skip_namespaces(config.skip_namespaces.clone())
            .with_resolver_options(config.resolver_options())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sidecar_init_containers(mut self, names: Vec<String>) -> Self {
        self.sidecar_init_containers = names;
        self
    }

    pub fn with_skip_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.skip_namespaces = namespaces;
        self
    }

    pub fn with_resolver_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    fn resolver(&self, cancel: &CancellationToken) -> OwnerResolver<'_> {
        OwnerResolver::new(self.cluster.as_ref(), self.clock.as_ref())
            .with_options(self.options)
            .with_cancellation(cancel.clone())
    }

    /// Whether the pod carries one of the configured sidecar init containers
    pub fn has_sidecar(&self, pod: &Pod) -> bool {
        has_sidecar_marker_with(pod, &self.sidecar_init_containers)
    }

    /// Expand a namespace selection into the list of namespaces to scan
    pub async fn namespaces(&self, selection: &NamespaceSelection) -> RestartResult<Vec<String>> {
        match selection {
            NamespaceSelection::Single(ns) => Ok(vec![ns.clone()]),
            NamespaceSelection::All => {
                let namespaces =
                    self.cluster
                        .list_namespaces()
                        .await
                        .map_err(|source| RestartError::Api {
                            action: ApiAction::List,
                            kind: "Namespace".to_string(),
                            namespace: String::new(),
                            name: String::new(),
                            source,
                        })?;
                Ok(without_skipped(namespaces, &self.skip_namespaces))
            }
        }
    }

    /// Resolve the first owner of a sidecar-injected pod in `namespace` and restart it
    pub async fn process_pod(
        &self,
        namespace: &str,
        pod: &Pod,
        cancel: &CancellationToken,
    ) -> RestartResult<ResolveOutcome> {
        match pod.owner_references().first() {
            Some(owner) => self.resolver(cancel).resolve(namespace, owner).await,
            None => Ok(ResolveOutcome::Unowned {
                kind: "Pod".to_string(),
                name: pod.name_any(),
            }),
        }
    }

    /// Restart every sidecar-injected workload in one namespace
    pub async fn restart_namespace(
        &self,
        namespace: &str,
        cancel: &CancellationToken,
        restarts: &mut Vec<RestartedWorkload>,
    ) -> NamespaceSummary {
        let mut summary = NamespaceSummary::new(namespace);

        let pods = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                summary.error = Some(RestartError::Cancelled.to_string());
                return summary;
            }
            pods = self.cluster.list_pods(namespace) => pods,
        };
        let pods = match pods {
            Ok(pods) => pods,
            Err(e) => {
                tracing::error!("Error listing pods in namespace {}: {}", namespace, e);
                summary.error = Some(e.to_string());
                return summary;
            }
        };

        for pod in pods.iter().filter(|p| self.has_sidecar(p)) {
            if cancel.is_cancelled() {
                break;
            }

            let pod_name = pod.name_any();
            tracing::info!(
                "Found pod {}/{} with sidecar injection enabled",
                namespace,
                pod_name
            );

            let result = self.process_pod(namespace, pod, cancel).await;
            match &result {
                Ok(ResolveOutcome::Restarted(workload)) => restarts.push(workload.clone()),
                Ok(ResolveOutcome::Unowned { kind, name }) => {
                    tracing::warn!(
                        "Pod {}/{} leads to {} {} which has no owner, nothing restarted",
                        namespace,
                        pod_name,
                        kind,
                        name
                    );
                }
                Ok(ResolveOutcome::Unsupported { kind, name }) => {
                    tracing::warn!(
                        "Pod {}/{} is owned by unsupported kind {} {}, nothing restarted",
                        namespace,
                        pod_name,
                        kind,
                        name
                    );
                }
                Err(RestartError::Cancelled) => {
                    tracing::warn!("Cancelled while processing pod {}/{}", namespace, pod_name);
                }
                Err(e) => {
                    tracing::error!("Error processing pod {}/{}: {}", namespace, pod_name, e);
                }
            }
            summary.record(&result);
            if matches!(result, Err(RestartError::Cancelled)) {
                break;
            }
        }

        summary
    }

    /// Restart the configured platform workloads
    pub async fn restart_platform_workloads(
        &self,
        workloads: &[PlatformWorkload],
        cancel: &CancellationToken,
        restarts: &mut Vec<RestartedWorkload>,
    ) -> PlatformSummary {
        let mut summary = PlatformSummary::default();
        let resolver = self.resolver(cancel);

        for workload in workloads {
            if cancel.is_cancelled() {
                break;
            }
            match resolver
                .restart_workload(workload.kind, &workload.namespace, &workload.name)
                .await
            {
                Ok(restarted) => {
                    summary.restarted += 1;
                    restarts.push(restarted);
                }
                Err(RestartError::Cancelled) => break,
                Err(e) => {
                    tracing::error!(
                        "Failed to restart {} {}/{}: {}",
                        workload.kind,
                        workload.namespace,
                        workload.name,
                        e
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Run a full restart pass
    ///
    /// Failures are logged and counted; only cancellation stops the run early.
    pub async fn run(
        &self,
        platform_workloads: &[PlatformWorkload],
        namespaces: &[String],
        cancel: &CancellationToken,
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        summary.platform = self
            .restart_platform_workloads(platform_workloads, cancel, &mut summary.restarts)
            .await;

        for namespace in namespaces {
            if cancel.is_cancelled() {
                break;
            }
            tracing::debug!("Processing namespace {}", namespace);
            let ns_summary = self
                .restart_namespace(namespace, cancel, &mut summary.restarts)
                .await;
            summary.namespaces.push(ns_summary);
        }

        summary.cancelled = cancel.is_cancelled();
        summary
    }
}
