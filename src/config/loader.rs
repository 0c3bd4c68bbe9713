//! Configuration loading
//!
//! Handles loading configuration from the config file and applying
//! environment variable overrides.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Config file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Load configuration using `path` as the config file
    ///
    /// A missing file means defaults; a file that fails to parse is an error.
    pub fn load_from(path: &Path) -> Result<Config> {
        let config = if path.exists() {
            Self::load_file(path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::load_defaults()
        };

        let config = Self::apply_env_overrides(config)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check values serde can't reject on its own
    pub fn validate(config: &Config) -> Result<()> {
        if config.sidecar_init_containers.is_empty() {
            anyhow::bail!("sidecarInitContainers must name at least one container");
        }
        if config.max_owner_depth == 0 {
            anyhow::bail!("maxOwnerDepth must be at least 1");
        }
        if let Some(workload) = config
            .platform_workloads
            .iter()
            .find(|w| w.name.is_empty() || w.namespace.is_empty())
        {
            anyhow::bail!(
                "platformWorkloads entry for {} needs both name and namespace",
                workload.kind
            );
        }
        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Result<Config> {
        // MESHROLL_MAX_OWNER_DEPTH override
        if let Ok(depth) = std::env::var("MESHROLL_MAX_OWNER_DEPTH") {
            config.max_owner_depth = depth
                .parse()
                .context("MESHROLL_MAX_OWNER_DEPTH must be a number")?;
        }

        // MESHROLL_CONFLICT_RETRIES override
        if let Ok(retries) = std::env::var("MESHROLL_CONFLICT_RETRIES") {
            config.conflict_retries = retries
                .parse()
                .context("MESHROLL_CONFLICT_RETRIES must be a number")?;
        }

        // MESHROLL_SKIP_NAMESPACES override (comma separated)
        if let Ok(skip) = std::env::var("MESHROLL_SKIP_NAMESPACES") {
            config.skip_namespaces = skip
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(config)
    }
}
