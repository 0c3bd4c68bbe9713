//! Typed wrapper over the restartable workload objects

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::ResourceExt;

use super::WorkloadKind;

/// A workload object fetched from the cluster
#[derive(Debug, Clone, PartialEq)]
pub enum Workload {
    Deployment(Deployment),
    DaemonSet(DaemonSet),
    StatefulSet(StatefulSet),
}

impl Workload {
    pub fn kind(&self) -> WorkloadKind {
        match self {
            Workload::Deployment(_) => WorkloadKind::Deployment,
            Workload::DaemonSet(_) => WorkloadKind::DaemonSet,
            Workload::StatefulSet(_) => WorkloadKind::StatefulSet,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Workload::Deployment(obj) => obj.name_any(),
            Workload::DaemonSet(obj) => obj.name_any(),
            Workload::StatefulSet(obj) => obj.name_any(),
        }
    }

    /// Pod template of the workload, if the object carries a spec
    pub fn pod_template(&self) -> Option<&PodTemplateSpec> {
        match self {
            Workload::Deployment(obj) => obj.spec.as_ref().map(|s| &s.template),
            Workload::DaemonSet(obj) => obj.spec.as_ref().map(|s| &s.template),
            Workload::StatefulSet(obj) => obj.spec.as_ref().map(|s| &s.template),
        }
    }

    pub fn pod_template_mut(&mut self) -> Option<&mut PodTemplateSpec> {
        match self {
            Workload::Deployment(obj) => obj.spec.as_mut().map(|s| &mut s.template),
            Workload::DaemonSet(obj) => obj.spec.as_mut().map(|s| &mut s.template),
            Workload::StatefulSet(obj) => obj.spec.as_mut().map(|s| &mut s.template),
        }
    }

    /// Annotations on the pod template (not on the workload itself)
    pub fn pod_template_annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.pod_template()
            .and_then(|t| t.metadata.as_ref())
            .and_then(|m| m.annotations.as_ref())
    }
}

impl From<Deployment> for Workload {
    fn from(obj: Deployment) -> Self {
        Workload::Deployment(obj)
    }
}

impl From<DaemonSet> for Workload {
    fn from(obj: DaemonSet) -> Self {
        Workload::DaemonSet(obj)
    }
}

impl From<StatefulSet> for Workload {
    fn from(obj: StatefulSet) -> Self {
        Workload::StatefulSet(obj)
    }
}
