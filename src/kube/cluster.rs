//! Cluster API seam
//!
//! The restart logic only needs a handful of typed calls. They live behind
//! [`ClusterApi`] so the resolver and batch driver can run against a mock or
//! an in-memory cluster in tests.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::{ListParams, PostParams};
use kube::{Api, Client, ResourceExt};

#[cfg(test)]
use mockall::automock;

use crate::models::{Workload, WorkloadKind};

/// Cluster operations used by the restart logic
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Get a ReplicaSet by namespace and name
    async fn get_replica_set(&self, namespace: &str, name: &str) -> Result<ReplicaSet, kube::Error>;

    /// Get a restartable workload by kind, namespace and name
    async fn get_workload(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
    ) -> Result<Workload, kube::Error>;

    /// Replace a workload with the given object
    ///
    /// The object's resourceVersion is sent along, so a concurrent change
    /// since it was read fails with 409 Conflict.
    async fn replace_workload(
        &self,
        namespace: &str,
        workload: &Workload,
    ) -> Result<Workload, kube::Error>;

    /// List all pods in a namespace
    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, kube::Error>;

    /// List the names of all namespaces
    async fn list_namespaces(&self) -> Result<Vec<String>, kube::Error>;
}

/// [`ClusterApi`] backed by a live `kube::Client`
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn get_replica_set(&self, namespace: &str, name: &str) -> Result<ReplicaSet, kube::Error> {
        let api: Api<ReplicaSet> = Api::namespaced(self.client.clone(), namespace);
        api.get(name).await
    }

    async fn get_workload(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
    ) -> Result<Workload, kube::Error> {
        macro_rules! get_workload {
            ($type:ty) => {{
                let api: Api<$type> = Api::namespaced(self.client.clone(), namespace);
                api.get(name).await.map(Workload::from)
            }};
        }

        match kind {
            WorkloadKind::Deployment => get_workload!(Deployment),
            WorkloadKind::DaemonSet => get_workload!(DaemonSet),
            WorkloadKind::StatefulSet => get_workload!(StatefulSet),
        }
    }

    async fn replace_workload(
        &self,
        namespace: &str,
        workload: &Workload,
    ) -> Result<Workload, kube::Error> {
        macro_rules! replace_workload {
            ($type:ty, $obj:expr) => {{
                let api: Api<$type> = Api::namespaced(self.client.clone(), namespace);
                api.replace(&$obj.name_any(), &PostParams::default(), $obj)
                    .await
                    .map(Workload::from)
            }};
        }

        match workload {
            Workload::Deployment(obj) => replace_workload!(Deployment, obj),
            Workload::DaemonSet(obj) => replace_workload!(DaemonSet, obj),
            Workload::StatefulSet(obj) => replace_workload!(StatefulSet, obj),
        }
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, kube::Error> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, kube::Error> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = api.list(&ListParams::default()).await?;
        Ok(namespaces.items.iter().map(|ns| ns.name_any()).collect())
    }
}
