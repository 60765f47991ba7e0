//! Multi-instrument batch configuration

use serde::{Deserialize, Serialize};

/// Multi-instrument batch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Dedicated pool size; `None` uses the global rayon pool
    pub parallel_threads: Option<usize>,

    /// Return results ordered by symbol
    pub sort_results: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            parallel_threads: None,
            sort_results: true,
        }
    }
}
