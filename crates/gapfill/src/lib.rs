//! Fair value gap lifecycle tracking over OHLC bar series.
//!
//! Produces the `fvg_fill_ratio_<N>` feature: for every bar, how much of the
//! currently tracked three-bar fair value gap has been traded back into,
//! as a value in `[0.0, 1.0]`. At most one gap is tracked at a time, from
//! the bar that creates it until it is fully covered or `N` bars old.
//!
//! ## Meta-Crate
//!
//! Re-exports the gapfill sub-crates behind features:
//!
//! - `gapfill-core` - Detection, coverage and the lifecycle tracker (always enabled)
//! - `gapfill-config` - Layered configuration and tracing setup
//! - `gapfill-batch` - Parallel multi-instrument computation
//!
//! ## Features
//!
//! - `config` - Configuration management
//! - `batch` - Batch engine (implies `config`)
//! - `full` - Enable all features
//!
//! ## Basic Usage
//!
//! ```rust
//! use gapfill::{compute_fill_ratio, TrackerConfig};
//!
//! let high = [100.0, 108.0, 115.0, 108.0, 111.0];
//! let low = [95.0, 99.0, 110.0, 104.0, 95.0];
//!
//! let series = compute_fill_ratio(&high, &low, TrackerConfig::default()).unwrap();
//! assert_eq!(series.name, "fvg_fill_ratio_30");
//! assert!((series.ratios()[3] - 0.4).abs() < 1e-12);
//! assert_eq!(series.ratios()[4], 1.0);
//! ```
//!
//! ## Streaming
//!
//! ```rust
//! use gapfill::{Bar, GapLifecycleTracker};
//!
//! let mut tracker = GapLifecycleTracker::with_max_lifetime(30).unwrap();
//! for bar in [Bar::new(0, 100.0, 95.0), Bar::new(1, 108.0, 99.0), Bar::new(2, 115.0, 110.0)] {
//!     let outcome = tracker.step(&bar).unwrap();
//!     assert_eq!(outcome.sample.ratio, 0.0);
//! }
//! assert_eq!(tracker.active_gap().map(|g| g.start_index), Some(2));
//!
//! // Persist and resume later
//! let json = tracker.create_checkpoint("EURUSD").to_json().unwrap();
//! let restored = gapfill::Checkpoint::from_json(&json).unwrap();
//! let tracker = GapLifecycleTracker::from_checkpoint(restored).unwrap();
//! assert!(tracker.active_gap().is_some());
//! ```

// Re-export core (always available)
pub use gapfill_core as core;

#[cfg(feature = "config")]
pub use gapfill_config as config;

#[cfg(feature = "batch")]
pub use gapfill_batch as batch;

// Re-export commonly used types at crate root for convenience
pub use gapfill_core::{
    compute_fill_ratio, feature_name, fill_ratio_for_bars, Bar, Checkpoint, CheckpointError,
    CoverageMode, FillRatioSeries, GapLifecycleTracker, LifecycleSummary, ProcessingError,
    TrackerConfig, DEFAULT_MAX_LIFETIME,
};

#[cfg(feature = "config")]
pub use gapfill_config::Settings;

#[cfg(feature = "batch")]
pub use gapfill_batch::{BatchConfig, BatchEngine, BatchError, SymbolResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert_eq!(NAME, "gapfill");
        assert!(!VERSION.is_empty());
        assert_eq!(feature_name(DEFAULT_MAX_LIFETIME), "fvg_fill_ratio_30");
    }
}
