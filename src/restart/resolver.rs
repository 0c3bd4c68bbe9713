//! Owner chain resolution
//!
//! Walks from a pod's owner reference up to the workload that manages it and
//! triggers a rolling restart of that workload.

use std::future::Future;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::ResourceExt;
use tokio_util::sync::CancellationToken;

use crate::error::{ApiAction, RestartError, RestartResult};
use crate::kube::ClusterApi;
use crate::models::{REPLICA_SET_KIND, WorkloadKind};
use crate::restart::annotations::mark_for_restart;
use crate::restart::clock::Clock;
use crate::restart::models::{ResolveOutcome, RestartedWorkload};

/// Default limit on owner hops before giving up on a chain
pub const DEFAULT_MAX_OWNER_DEPTH: usize = 10;

/// Default number of re-fetch attempts after an update conflict
pub const DEFAULT_CONFLICT_RETRIES: u32 = 3;

/// Tunables for owner resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Maximum owner references followed from the pod
    pub max_owner_depth: usize,
    /// Extra fetch-mutate-update attempts after a 409 Conflict
    pub conflict_retries: u32,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_owner_depth: DEFAULT_MAX_OWNER_DEPTH,
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }
}

/// Resolves owner references to workloads and restarts them
pub struct OwnerResolver<'a> {
    cluster: &'a dyn ClusterApi,
    clock: &'a dyn Clock,
    options: ResolverOptions,
    cancel: CancellationToken,
}

impl<'a> OwnerResolver<'a> {
    pub fn new(cluster: &'a dyn ClusterApi, clock: &'a dyn Clock) -> Self {
        Self {
            cluster,
            clock,
            options: ResolverOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Abort in-flight API calls when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Follow `owner` up to a restartable workload in `namespace` and restart it
    ///
    /// Only the first owner reference is followed at each level.
    pub async fn resolve(
        &self,
        namespace: &str,
        owner: &OwnerReference,
    ) -> RestartResult<ResolveOutcome> {
        let mut kind = owner.kind.clone();
        let mut name = owner.name.clone();

        // Loop instead of recursing so the future doesn't need boxing
        for depth in 0..self.options.max_owner_depth {
            if kind != REPLICA_SET_KIND {
                return match WorkloadKind::parse_optional(&kind) {
                    Some(workload_kind) => self
                        .restart_workload(workload_kind, namespace, &name)
                        .await
                        .map(ResolveOutcome::Restarted),
                    None => {
                        tracing::debug!("Unsupported owner kind {} {}/{}", kind, namespace, name);
                        Ok(ResolveOutcome::Unsupported { kind, name })
                    }
                };
            }

            tracing::debug!(
                "Resolving {} {}/{} at depth {}",
                kind,
                namespace,
                name,
                depth
            );
            let replica_set = self
                .call(
                    ApiAction::Get,
                    &kind,
                    namespace,
                    &name,
                    self.cluster.get_replica_set(namespace, &name),
                )
                .await?;

            match replica_set.owner_references().first() {
                Some(next) => {
                    kind = next.kind.clone();
                    name = next.name.clone();
                }
                None => {
                    tracing::debug!("{} {}/{} has no owner", kind, namespace, name);
                    return Ok(ResolveOutcome::Unowned { kind, name });
                }
            }
        }

        Err(RestartError::OwnerChainTooDeep {
            kind,
            namespace: namespace.to_string(),
            name,
            limit: self.options.max_owner_depth,
        })
    }

    /// Restart a workload, re-reading it and retrying when the update conflicts
    pub async fn restart_workload(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
    ) -> RestartResult<RestartedWorkload> {
        let mut conflicts = 0;
        loop {
            match self.try_restart_workload(kind, namespace, name).await {
                Err(e) if e.is_conflict() && conflicts < self.options.conflict_retries => {
                    conflicts += 1;
                    tracing::warn!(
                        "Conflict updating {} {}/{}, retrying with a fresh copy ({}/{})",
                        kind,
                        namespace,
                        name,
                        conflicts,
                        self.options.conflict_retries
                    );
                }
                result => return result,
            }
        }
    }

    /// One get, annotate, replace cycle against the latest stored object
    async fn try_restart_workload(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
    ) -> RestartResult<RestartedWorkload> {
        let mut workload = self
            .call(
                ApiAction::Get,
                kind.as_str(),
                namespace,
                name,
                self.cluster.get_workload(kind, namespace, name),
            )
            .await?;

        let template =
            workload
                .pod_template_mut()
                .ok_or_else(|| RestartError::MissingPodTemplate {
                    kind: kind.to_string(),
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })?;
        let restarted_at = mark_for_restart(template, self.clock.now());

        self.call(
            ApiAction::Update,
            kind.as_str(),
            namespace,
            name,
            self.cluster.replace_workload(namespace, &workload),
        )
        .await?;

        tracing::info!(
            "Triggered restart for {} {}/{} at {}",
            kind,
            namespace,
            name,
            restarted_at
        );
        Ok(RestartedWorkload {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
            restarted_at,
        })
    }

    /// Await a cluster call, giving up early on cancellation
    async fn call<T>(
        &self,
        action: ApiAction,
        kind: &str,
        namespace: &str,
        name: &str,
        request: impl Future<Output = Result<T, kube::Error>>,
    ) -> RestartResult<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(RestartError::Cancelled),
            result = request => result.map_err(|source| RestartError::Api {
                action,
                kind: kind.to_string(),
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            }),
        }
    }
}
