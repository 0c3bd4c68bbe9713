//! Service layer for business logic
//!
//! Sits between the CLI and the restart logic: picks namespaces, scans pods
//! and collects the run summary.

pub mod namespaces;
pub mod rollout_service;
pub mod summary;

pub use namespaces::NamespaceSelection;
pub use rollout_service::RolloutService;
pub use summary::{NamespaceSummary, PlatformSummary, RunSummary};
