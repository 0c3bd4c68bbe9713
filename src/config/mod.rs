//! Configuration system for meshroll
//!
//! A single optional YAML file layered over built-in defaults, with a few
//! environment variable overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, PlatformWorkload};
