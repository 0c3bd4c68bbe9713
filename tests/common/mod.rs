//! Shared test fixtures: an in-memory cluster and object builders

#![allow(dead_code)] // Not every test binary uses every helper

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use k8s_openapi::api::apps::v1::{
    DaemonSet, DaemonSetSpec, Deployment, DeploymentSpec, ReplicaSet, StatefulSet,
    StatefulSetSpec,
};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::core::ErrorResponse;

use meshroll::kube::ClusterApi;
use meshroll::models::{Workload, WorkloadKind};
use meshroll::restart::Clock;

type Hook = Box<dyn FnMut(&mut Workload) + Send>;

#[derive(Default)]
struct State {
    namespaces: Vec<String>,
    pods: HashMap<String, Vec<Pod>>,
    replica_sets: HashMap<(String, String), ReplicaSet>,
    workloads: HashMap<(String, WorkloadKind, String), Workload>,
    unlistable: HashSet<String>,
    stalled: HashSet<String>,
    calls: Vec<String>,
    updates: Vec<Workload>,
    before_replace: Option<Hook>,
}

/// In-memory cluster that enforces resourceVersion on replace like the API server
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_namespace(&self, namespace: &str) {
        self.state
            .lock()
            .unwrap()
            .namespaces
            .push(namespace.to_string());
    }

    pub fn add_pod(&self, mut pod: Pod) {
        let namespace = pod.metadata.namespace.clone().unwrap_or_default();
        pod.metadata.namespace = Some(namespace.clone());
        self.state
            .lock()
            .unwrap()
            .pods
            .entry(namespace)
            .or_default()
            .push(pod);
    }

    pub fn add_replica_set(&self, replica_set: ReplicaSet) {
        let key = (
            replica_set.metadata.namespace.clone().unwrap_or_default(),
            replica_set.metadata.name.clone().unwrap_or_default(),
        );
        self.state
            .lock()
            .unwrap()
            .replica_sets
            .insert(key, replica_set);
    }

    pub fn add_workload(&self, mut workload: Workload) {
        let meta = metadata_mut(&mut workload);
        meta.resource_version = Some("1".to_string());
        let key = (
            meta.namespace.clone().unwrap_or_default(),
            workload.kind(),
            workload.name(),
        );
        self.state.lock().unwrap().workloads.insert(key, workload);
    }

    /// Make `list_pods` fail for a namespace
    pub fn fail_listing(&self, namespace: &str) {
        self.state
            .lock()
            .unwrap()
            .unlistable
            .insert(namespace.to_string());
    }

    /// Make `get_replica_set` for `name` never answer
    pub fn stall_replica_set(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .stalled
            .insert(name.to_string());
    }

    /// Run `hook` against the stored object right before the next replace is applied
    ///
    /// Simulates another writer racing the restart. The hook's change bumps the
    /// stored resourceVersion, so the pending replace conflicts.
    pub fn before_next_replace(&self, hook: impl FnMut(&mut Workload) + Send + 'static) {
        self.state.lock().unwrap().before_replace = Some(Box::new(hook));
    }

    pub fn workload(&self, namespace: &str, kind: WorkloadKind, name: &str) -> Option<Workload> {
        self.state
            .lock()
            .unwrap()
            .workloads
            .get(&(namespace.to_string(), kind, name.to_string()))
            .cloned()
    }

    /// Successful replace calls, in order
    pub fn updates(&self) -> Vec<Workload> {
        self.state.lock().unwrap().updates.clone()
    }

    /// Every API call made, as "verb Kind namespace/name"
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn get_replica_set(&self, namespace: &str, name: &str) -> Result<ReplicaSet, kube::Error> {
        let stalled = {
            let mut state = self.state.lock().unwrap();
            state
                .calls
                .push(format!("get ReplicaSet {}/{}", namespace, name));
            state.stalled.contains(name)
        };
        if stalled {
            std::future::pending::<()>().await;
        }

        let state = self.state.lock().unwrap();
        state
            .replica_sets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| not_found("replicasets", name))
    }

    async fn get_workload(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
    ) -> Result<Workload, kube::Error> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("get {} {}/{}", kind, namespace, name));
        state
            .workloads
            .get(&(namespace.to_string(), kind, name.to_string()))
            .cloned()
            .ok_or_else(|| not_found(kind.as_str(), name))
    }

    async fn replace_workload(
        &self,
        namespace: &str,
        workload: &Workload,
    ) -> Result<Workload, kube::Error> {
        let mut state = self.state.lock().unwrap();
        let kind = workload.kind();
        let name = workload.name();
        state
            .calls
            .push(format!("replace {} {}/{}", kind, namespace, name));

        let key = (namespace.to_string(), kind, name.clone());
        let mut hook = state.before_replace.take();
        let stored = state
            .workloads
            .get_mut(&key)
            .ok_or_else(|| not_found(kind.as_str(), &name))?;

        if let Some(hook) = hook.as_mut() {
            hook(stored);
            bump_resource_version(stored);
        }

        let mut incoming = workload.clone();
        let stored_version = metadata_mut(stored).resource_version.clone();
        if metadata_mut(&mut incoming).resource_version != stored_version {
            return Err(api_error(409, "Conflict", "the object has been modified"));
        }

        *stored = incoming;
        bump_resource_version(stored);
        let updated = stored.clone();
        state.updates.push(updated.clone());
        Ok(updated)
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, kube::Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("list Pod {}", namespace));
        if state.unlistable.contains(namespace) {
            return Err(api_error(403, "Forbidden", "pods is forbidden"));
        }
        Ok(state.pods.get(namespace).cloned().unwrap_or_default())
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, kube::Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("list Namespace".to_string());
        Ok(state.namespaces.clone())
    }
}

fn metadata_mut(workload: &mut Workload) -> &mut ObjectMeta {
    match workload {
        Workload::Deployment(obj) => &mut obj.metadata,
        Workload::DaemonSet(obj) => &mut obj.metadata,
        Workload::StatefulSet(obj) => &mut obj.metadata,
    }
}

fn bump_resource_version(workload: &mut Workload) {
    let meta = metadata_mut(workload);
    let next = meta
        .resource_version
        .as_deref()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0)
        + 1;
    meta.resource_version = Some(next.to_string());
}

pub fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    })
}

fn not_found(resource: &str, name: &str) -> kube::Error {
    api_error(
        404,
        "NotFound",
        &format!("{} \"{}\" not found", resource, name),
    )
}

/// Clock that advances one second on every read
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub fn new() -> Self {
        Self {
            next: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + Duration::seconds(1);
        now
    }
}

pub fn owner(kind: &str, name: &str) -> OwnerReference {
    OwnerReference {
        api_version: "apps/v1".to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
        uid: format!("{}-uid", name),
        controller: Some(true),
        ..Default::default()
    }
}

fn meta(namespace: &str, name: &str, owner_ref: Option<OwnerReference>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        owner_references: owner_ref.map(|o| vec![o]),
        ..Default::default()
    }
}

pub fn pod(
    namespace: &str,
    name: &str,
    init_containers: &[&str],
    owner_ref: Option<OwnerReference>,
) -> Pod {
    Pod {
        metadata: meta(namespace, name, owner_ref),
        spec: Some(PodSpec {
            init_containers: Some(
                init_containers
                    .iter()
                    .map(|c| Container {
                        name: c.to_string(),
                        ..Default::default()
                    })
                    .collect(),
            ),
            containers: vec![Container {
                name: "app".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }),
        status: None,
    }
}

pub fn replica_set(namespace: &str, name: &str, owner_ref: Option<OwnerReference>) -> ReplicaSet {
    ReplicaSet {
        metadata: meta(namespace, name, owner_ref),
        ..Default::default()
    }
}

fn template(annotations: &[(&str, &str)]) -> PodTemplateSpec {
    let annotations: BTreeMap<String, String> = annotations
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    PodTemplateSpec {
        metadata: Some(ObjectMeta {
            annotations: if annotations.is_empty() {
                None
            } else {
                Some(annotations)
            },
            ..Default::default()
        }),
        spec: None,
    }
}

pub fn deployment(namespace: &str, name: &str, annotations: &[(&str, &str)]) -> Workload {
    Workload::Deployment(Deployment {
        metadata: meta(namespace, name, None),
        spec: Some(DeploymentSpec {
            template: template(annotations),
            ..Default::default()
        }),
        status: None,
    })
}

pub fn daemon_set(namespace: &str, name: &str, annotations: &[(&str, &str)]) -> Workload {
    Workload::DaemonSet(DaemonSet {
        metadata: meta(namespace, name, None),
        spec: Some(DaemonSetSpec {
            template: template(annotations),
            ..Default::default()
        }),
        status: None,
    })
}

pub fn stateful_set(namespace: &str, name: &str, annotations: &[(&str, &str)]) -> Workload {
    Workload::StatefulSet(StatefulSet {
        metadata: meta(namespace, name, None),
        spec: Some(StatefulSetSpec {
            template: template(annotations),
            ..Default::default()
        }),
        status: None,
    })
}

/// Pod template annotations of a workload, empty when unset
pub fn template_annotations(workload: &Workload) -> BTreeMap<String, String> {
    workload
        .pod_template_annotations()
        .cloned()
        .unwrap_or_default()
}
