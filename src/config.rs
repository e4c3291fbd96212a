//! Planner configuration.
//!
//! # Example
//!
//! ```
//! use cdn_placement::{AffinityOrder, PlannerConfig};
//!
//! // Defaults: slowest-first scan, dataset capacity
//! let config = PlannerConfig::default();
//! assert_eq!(config.affinity_order, AffinityOrder::SlowestFirst);
//!
//! // From TOML; missing keys take their defaults
//! let config = PlannerConfig::from_toml_str(r#"
//!     affinity_order = "fastest_first"
//!     capacity_override = 50000
//! "#).unwrap();
//! assert_eq!(config.capacity_override, Some(50000));
//! assert_eq!(config.progress_every, 10_000);
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::affinity::AffinityOrder;
use crate::catalog::Catalog;
use crate::error::ConfigError;

/// Settings for one planning run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Direction the allocator scans an endpoint's caches
    #[serde(default)]
    pub affinity_order: AffinityOrder,

    /// Uniform cache capacity replacing the dataset's value
    #[serde(default)]
    pub capacity_override: Option<u64>,

    /// Iterations between progress events (0 = disabled)
    #[serde(default = "default_progress_every")]
    pub progress_every: u64,
}

fn default_progress_every() -> u64 {
    10_000
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            affinity_order: AffinityOrder::default(),
            capacity_override: None,
            progress_every: default_progress_every(),
        }
    }
}

impl PlannerConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply catalog-level overrides before allocation
    pub fn apply(&self, catalog: &mut Catalog) {
        if let Some(capacity) = self.capacity_override {
            catalog.set_cache_capacity(capacity);
        }
    }
}
