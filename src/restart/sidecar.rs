//! Sidecar injection detection

use k8s_openapi::api::core::v1::Pod;

/// Init container added by the istio sidecar injector
pub const ISTIO_INIT_CONTAINER: &str = "istio-init";

/// Init container added instead of `istio-init` when the istio CNI plugin is in use
pub const ISTIO_VALIDATION_CONTAINER: &str = "istio-validation";

/// Init container names recognized when no override is configured
pub const DEFAULT_SIDECAR_INIT_CONTAINERS: &[&str] =
    &[ISTIO_INIT_CONTAINER, ISTIO_VALIDATION_CONTAINER];

/// Whether the pod was injected with a mesh sidecar
pub fn has_sidecar_marker(pod: &Pod) -> bool {
    has_sidecar_marker_with(pod, DEFAULT_SIDECAR_INIT_CONTAINERS)
}

/// Whether any of the pod's init containers is named in `marker_names`
pub fn has_sidecar_marker_with<S: AsRef<str>>(pod: &Pod, marker_names: &[S]) -> bool {
    pod.spec
        .as_ref()
        .and_then(|spec| spec.init_containers.as_ref())
        .is_some_and(|containers| {
            containers
                .iter()
                .any(|c| marker_names.iter().any(|m| m.as_ref() == c.name))
        })
}
