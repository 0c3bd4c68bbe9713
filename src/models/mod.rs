//! Model layer
//!
//! Typed views over the Kubernetes objects the restart logic walks through.

mod workload;
mod workload_kind;

pub use workload::Workload;
pub use workload_kind::{REPLICA_SET_KIND, WorkloadKind};
