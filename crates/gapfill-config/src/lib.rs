//! Configuration management for gapfill
//!
//! Centralized configuration handling with support for:
//! - Default values
//! - Configuration files (TOML)
//! - Environment variables
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables (`GAPFILL_TRACKER__DEFAULT_MAX_LIFETIME=50`)
//! 2. Configuration file (`gapfill.toml`)
//! 3. Default values

mod app;
mod batch;
mod logging;
mod tracker;

// Re-export main types
pub use app::{AppConfig, LogLevel};
pub use batch::BatchSettings;
pub use logging::{env_filter, init_tracing};
pub use tracker::TrackerSettings;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure containing all configuration categories
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Application-wide settings
    pub app: AppConfig,

    /// Gap tracker configuration
    pub tracker: TrackerSettings,

    /// Multi-instrument batch configuration
    pub batch: BatchSettings,
}

impl Settings {
    /// Load configuration from multiple sources with proper precedence
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&Settings::default())?)
            // Add configuration file if it exists
            .add_source(
                config::File::with_name("gapfill")
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            // Add environment variables with GAPFILL_ prefix
            .add_source(
                config::Environment::with_prefix("GAPFILL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::from(path).format(config::FileFormat::Toml));

        builder.build()?.try_deserialize()
    }
}
