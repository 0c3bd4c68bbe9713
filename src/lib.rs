//! meshroll library
//!
//! Core functionality for the meshroll binary: sidecar detection, owner chain
//! resolution and the restart run driver. Exposed as a library for testing.

pub mod config;
pub mod error;
pub mod kube;
pub mod models;
pub mod restart;
pub mod services;

// Re-export commonly used types for convenience
pub use error::{ApiAction, RestartError, RestartResult};
pub use restart::{OwnerResolver, ResolveOutcome, RestartedWorkload};
pub use services::{NamespaceSelection, RolloutService, RunSummary};
