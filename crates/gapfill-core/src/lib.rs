//! Fair value gap lifecycle tracking
//!
//! Streaming, single-gap tracker that turns a bar sequence into an aligned
//! fill-ratio feature (`fvg_fill_ratio_{lifetime}`).
//!
//! ## Features
//!
//! - Three-bar gap detection (bullish and bearish)
//! - Single active gap: new candidates are ignored until the current gap expires
//! - Bounded lifetime: gaps expire when filled or after `max_lifetime` bars
//! - Envelope coverage (reference-compatible) or exact union coverage
//! - Pure per-bar transition, so the fold is resumable from a **checkpoint**
//! - Total over bad input: invalid bars are absorbed, never fail the series

pub mod checkpoint;
pub mod coverage;
pub mod detector;
pub mod errors;
pub mod tracker;
pub mod types;

// Test utilities (only available in test builds or with test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used types
pub use checkpoint::{Checkpoint, CheckpointError, LifecycleSummary, PositionVerification};
pub use coverage::{Coverage, CoverageMode};
pub use detector::detect_gap;
pub use errors::ProcessingError;
pub use tracker::{
    compute_fill_ratio, fill_ratio_for_bars, ActiveGap, ExpiryReason, GapLifecycleTracker, Phase,
    StepOutcome, TraceEntry, TrackerConfig, TrackerState, DEFAULT_MAX_LIFETIME,
};
pub use types::{
    feature_name, Bar, FillRatioSample, FillRatioSeries, GapCandidate, GapDirection, Interval,
};
