//! Policy file loader
//!
//! Loads `routing_policy.yaml` from the config directory.

use std::path::{Path, PathBuf};
use tracing::info;

use super::{PolicyConfig, RoutingPolicy};
use crate::error::RoutingResult;

pub const POLICY_FILE: &str = "routing_policy.yaml";

pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Create loader from PROCUREMENT_CONFIG_DIR env var or default to "config"
    pub fn from_env() -> Self {
        let dir =
            std::env::var("PROCUREMENT_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        Self::new(dir)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn policy_path(&self) -> PathBuf {
        self.config_dir.join(POLICY_FILE)
    }

    /// Load the policy file, or the built-in defaults if it does not exist.
    /// A file that exists but fails to parse or validate is an error.
    pub fn load_config(&self) -> RoutingResult<PolicyConfig> {
        let path = self.policy_path();
        if !path.exists() {
            info!(
                "No routing policy at {}; using built-in defaults",
                path.display()
            );
            return Ok(PolicyConfig::default());
        }

        info!("Loading routing policy from {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        let config = Self::parse(&content)?;

        info!(
            "Loaded routing policy: {} pre-approved vendors, {} department budgets",
            config.vendors.pre_approved.len(),
            config.department_budgets.len()
        );

        Ok(config)
    }

    /// Load and compile the policy
    pub fn load_policy(&self) -> RoutingResult<RoutingPolicy> {
        RoutingPolicy::from_config(self.load_config()?)
    }

    /// Parse a policy from a YAML string
    pub fn parse(yaml: &str) -> RoutingResult<PolicyConfig> {
        let config: PolicyConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }
}
