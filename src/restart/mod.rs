//! Restart logic
//!
//! Detects sidecar-injected pods, walks their owner references to the managing
//! workload and stamps the workload's pod template so the rollout controller
//! replaces every pod. Similar to `kubectl rollout restart`, but driven from
//! the pods instead of the workloads.

pub mod annotations;
mod clock;
mod models;
mod resolver;
pub mod sidecar;

pub use annotations::{RESTARTED_AT_ANNOTATION, format_restart_time, with_restart_marker};
pub use clock::{Clock, SystemClock};
pub use models::{ResolveOutcome, RestartedWorkload};
pub use resolver::{
    DEFAULT_CONFLICT_RETRIES, DEFAULT_MAX_OWNER_DEPTH, OwnerResolver, ResolverOptions,
};
pub use sidecar::{DEFAULT_SIDECAR_INIT_CONTAINERS, has_sidecar_marker, has_sidecar_marker_with};
