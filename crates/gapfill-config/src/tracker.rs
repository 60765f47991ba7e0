//! Gap tracker configuration

use gapfill_core::{CoverageMode, TrackerConfig, DEFAULT_MAX_LIFETIME};
use serde::{Deserialize, Serialize};

/// Gap tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Lifetime in bars used when a caller does not ask for one
    pub default_max_lifetime: usize,

    /// Smallest accepted lifetime
    pub min_max_lifetime: usize,

    /// Largest accepted lifetime
    pub max_max_lifetime: usize,

    /// Coverage accumulation mode (`envelope` reproduces reference values)
    pub coverage_mode: CoverageMode,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            default_max_lifetime: DEFAULT_MAX_LIFETIME,
            min_max_lifetime: 1,
            max_max_lifetime: 100_000,
            coverage_mode: CoverageMode::Envelope,
        }
    }
}

impl TrackerSettings {
    /// Validate lifetime is within acceptable bounds
    pub fn validate_lifetime(&self, max_lifetime: usize) -> Result<(), String> {
        if max_lifetime < self.min_max_lifetime.max(1) {
            return Err(format!(
                "Max lifetime {} bars is below minimum {} bars",
                max_lifetime,
                self.min_max_lifetime.max(1)
            ));
        }

        if max_lifetime > self.max_max_lifetime {
            return Err(format!(
                "Max lifetime {} bars exceeds maximum {} bars",
                max_lifetime, self.max_max_lifetime
            ));
        }

        Ok(())
    }

    /// Build a validated tracker config, falling back to the default lifetime
    pub fn to_tracker_config(&self, max_lifetime: Option<usize>) -> Result<TrackerConfig, String> {
        let lifetime = max_lifetime.unwrap_or(self.default_max_lifetime);
        self.validate_lifetime(lifetime)?;
        Ok(TrackerConfig::new(lifetime).with_coverage_mode(self.coverage_mode))
    }
}
