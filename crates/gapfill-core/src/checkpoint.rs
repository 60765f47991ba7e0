//! Checkpoint system for resumable gap tracking
//!
//! The tracker is a left fold over the bar sequence, so the fold state after
//! a prefix is all that is needed to continue on the suffix:
//!
//! ```text
//! Chunk 1 processed → save Checkpoint
//! Chunk 2 arrives   → load Checkpoint → continue with identical ratios
//! ```
//!
//! ## Key Invariants
//!
//! - The active gap's bounds and start index are IMMUTABLE for its lifetime
//! - Coverage always lies inside the gap bounds
//! - The two-bar lookback travels with the checkpoint, so a gap whose `i-2`
//!   reference sits in the previous chunk is still detected

use crate::coverage::CoverageMode;
use crate::tracker::{ExpiryReason, Phase, TrackerConfig, TrackerState};
use crate::types::{Bar, GapDirection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Checkpoint for continuing a tracker on a later chunk of bars
///
/// # Example
///
/// ```ignore
/// let first = tracker.process_bars(&bars[..500])?;
/// let json = tracker.create_checkpoint("EURUSD").to_json()?;
/// std::fs::write("eurusd.ckpt.json", json)?;
///
/// // ... later ...
/// let checkpoint = Checkpoint::from_json(&std::fs::read_to_string("eurusd.ckpt.json")?)?;
/// let mut tracker = GapLifecycleTracker::from_checkpoint(checkpoint)?;
/// let rest = tracker.process_bars(&bars[500..])?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkpoint {
    /// Series identifier (e.g., "BTCUSDT", "EURUSD")
    pub symbol: String,

    /// Tracker configuration the state was produced under
    pub config: TrackerConfig,

    /// Fold state after the last processed bar
    pub state: TrackerState,

    /// Lifecycle counters for monitoring
    #[serde(default)]
    pub summary: LifecycleSummary,

    /// Library version that wrote the checkpoint
    #[serde(default = "default_library_version")]
    pub library_version: String,
}

fn default_library_version() -> String {
    Checkpoint::library_version().to_string()
}

impl Checkpoint {
    pub fn new(
        symbol: String,
        config: TrackerConfig,
        state: TrackerState,
        summary: LifecycleSummary,
    ) -> Self {
        Self {
            symbol,
            config,
            state,
            summary,
            library_version: default_library_version(),
        }
    }

    /// A gap was active when the checkpoint was taken
    pub fn has_active_gap(&self) -> bool {
        matches!(self.state.phase, Phase::Active(_))
    }

    /// Check structural consistency before resuming
    ///
    /// A degenerate gap (`gap_high <= gap_low`) passes; the tracker expires it
    /// on the next bar.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.config.max_lifetime == 0 {
            return Err(CheckpointError::InvalidLifetime {
                max_lifetime: self.config.max_lifetime,
            });
        }

        if let Phase::Active(gap) = &self.state.phase {
            let found = gap.coverage.mode();
            if found != self.config.coverage_mode {
                return Err(CheckpointError::CoverageModeMismatch {
                    expected: self.config.coverage_mode,
                    found,
                });
            }
            if gap.bounds().has_extent() && !gap.coverage.is_consistent_with(&gap.bounds()) {
                return Err(CheckpointError::CoverageOutOfBounds {
                    start_index: gap.start_index,
                });
            }
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationError {
            message: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::SerializationError {
            message: e.to_string(),
        })
    }

    /// Get the library version that created this checkpoint
    pub fn library_version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

/// Lifecycle counters (monitoring only, never affect processing)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifecycleSummary {
    pub bullish_opened: u32,
    pub bearish_opened: u32,

    /// Gaps that reached a ratio of 1.0
    pub filled: u32,

    /// Gaps discarded at max lifetime
    pub aged_out: u32,

    /// Gaps expired because `gap_high <= gap_low`
    pub degenerate: u32,

    /// Bars with missing, non-finite or inverted high/low
    pub invalid_bars: u32,
}

impl LifecycleSummary {
    pub fn record_opened(&mut self, direction: GapDirection) {
        match direction {
            GapDirection::Bullish => self.bullish_opened += 1,
            GapDirection::Bearish => self.bearish_opened += 1,
        }
    }

    pub fn record_expiry(&mut self, reason: ExpiryReason) {
        match reason {
            ExpiryReason::Filled => self.filled += 1,
            ExpiryReason::Aged => self.aged_out += 1,
            ExpiryReason::Degenerate => self.degenerate += 1,
        }
    }

    pub fn record_invalid_bar(&mut self) {
        self.invalid_bars += 1;
    }

    pub fn opened(&self) -> u32 {
        self.bullish_opened + self.bearish_opened
    }

    pub fn expired(&self) -> u32 {
        self.filled + self.aged_out + self.degenerate
    }

    /// Share of expired gaps that were completely filled
    pub fn fill_rate(&self) -> f64 {
        match self.expired() {
            0 => 0.0,
            n => self.filled as f64 / n as f64,
        }
    }
}

/// Position verification result when resuming from checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionVerification {
    /// No bar processed yet, any index is acceptable
    Fresh,

    /// Next bar directly follows the last processed one
    Exact,

    /// Bars are missing between the checkpoint and the new chunk
    Gap {
        expected_index: usize,
        actual_index: usize,
        missing_count: usize,
    },

    /// New chunk replays bars already folded into the state
    Overlap {
        last_index: usize,
        actual_index: usize,
    },
}

impl PositionVerification {
    pub fn verify(state: &TrackerState, first_bar: &Bar) -> Self {
        match state.last_index {
            None => PositionVerification::Fresh,
            Some(last) if first_bar.index <= last => PositionVerification::Overlap {
                last_index: last,
                actual_index: first_bar.index,
            },
            Some(last) if first_bar.index == last + 1 => PositionVerification::Exact,
            Some(last) => PositionVerification::Gap {
                expected_index: last + 1,
                actual_index: first_bar.index,
                missing_count: first_bar.index - last - 1,
            },
        }
    }

    pub fn has_gap(&self) -> bool {
        matches!(self, PositionVerification::Gap { .. })
    }

    /// The chunk can be folded without an ordering error
    pub fn can_continue(&self) -> bool {
        !matches!(self, PositionVerification::Overlap { .. })
    }
}

/// Checkpoint-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckpointError {
    #[error("Invalid max lifetime in checkpoint: {max_lifetime} bars")]
    InvalidLifetime { max_lifetime: usize },

    #[error("Coverage outside gap bounds for gap started at index {start_index} - corrupted checkpoint")]
    CoverageOutOfBounds { start_index: usize },

    #[error("Coverage mode mismatch: config has {expected:?}, active gap has {found:?}")]
    CoverageModeMismatch {
        expected: CoverageMode,
        found: CoverageMode,
    },

    #[error("Checkpoint serialization error: {message}")]
    SerializationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::Coverage;
    use crate::tracker::ActiveGap;
    use crate::types::Interval;

    fn active_state(coverage: Coverage) -> TrackerState {
        TrackerState {
            phase: Phase::Active(ActiveGap {
                direction: GapDirection::Bullish,
                gap_low: 100.0,
                gap_high: 110.0,
                start_index: 2,
                coverage,
            }),
            lookback: [Some(Interval::new(99.0, 101.0)), Some(Interval::new(105.0, 112.0))],
            last_index: Some(3),
        }
    }

    #[test]
    fn test_checkpoint_creation() {
        let checkpoint = Checkpoint::new(
            "BTCUSDT".to_string(),
            TrackerConfig::default(),
            TrackerState::default(),
            LifecycleSummary::default(),
        );

        assert_eq!(checkpoint.symbol, "BTCUSDT");
        assert_eq!(checkpoint.config.max_lifetime, 30);
        assert!(!checkpoint.has_active_gap());
        assert!(checkpoint.validate().is_ok());
    }

    #[test]
    fn test_checkpoint_json_roundtrip() {
        let checkpoint = Checkpoint::new(
            "EURUSD".to_string(),
            TrackerConfig::default(),
            active_state(Coverage::Envelope {
                envelope: Some(Interval::new(104.0, 108.0)),
            }),
            LifecycleSummary::default(),
        );

        let json = checkpoint.to_json().unwrap();
        assert!(json.contains("EURUSD"));
        assert!(json.contains("\"phase\":\"active\""));

        let restored = Checkpoint::from_json(&json).unwrap();
        assert_eq!(restored, checkpoint);
        assert!(restored.has_active_gap());
    }

    #[test]
    fn test_checkpoint_missing_optional_fields() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "config": {"max_lifetime": 30},
            "state": {"phase": {"phase": "idle"}, "lookback": [null, null], "last_index": null}
        }"#;

        let checkpoint = Checkpoint::from_json(json).unwrap();
        assert_eq!(checkpoint.config.coverage_mode, CoverageMode::Envelope);
        assert_eq!(checkpoint.summary, LifecycleSummary::default());
        assert_eq!(checkpoint.library_version, Checkpoint::library_version());
    }

    #[test]
    fn test_checkpoint_garbage_json() {
        let err = Checkpoint::from_json("{not json").unwrap_err();
        assert!(matches!(err, CheckpointError::SerializationError { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_lifetime() {
        let checkpoint = Checkpoint::new(
            "X".to_string(),
            TrackerConfig::new(0),
            TrackerState::default(),
            LifecycleSummary::default(),
        );
        assert_eq!(
            checkpoint.validate(),
            Err(CheckpointError::InvalidLifetime { max_lifetime: 0 })
        );
    }

    #[test]
    fn test_validate_rejects_coverage_outside_gap() {
        let checkpoint = Checkpoint::new(
            "X".to_string(),
            TrackerConfig::default(),
            active_state(Coverage::Envelope {
                envelope: Some(Interval::new(95.0, 108.0)),
            }),
            LifecycleSummary::default(),
        );
        assert_eq!(
            checkpoint.validate(),
            Err(CheckpointError::CoverageOutOfBounds { start_index: 2 })
        );
    }

    #[test]
    fn test_validate_rejects_mode_mismatch() {
        let checkpoint = Checkpoint::new(
            "X".to_string(),
            TrackerConfig::default().with_coverage_mode(CoverageMode::Union),
            active_state(Coverage::empty(CoverageMode::Envelope)),
            LifecycleSummary::default(),
        );
        assert!(matches!(
            checkpoint.validate(),
            Err(CheckpointError::CoverageModeMismatch { .. })
        ));
    }

    #[test]
    fn test_lifecycle_summary() {
        let mut summary = LifecycleSummary::default();
        assert_eq!(summary.fill_rate(), 0.0);

        summary.record_opened(GapDirection::Bullish);
        summary.record_opened(GapDirection::Bearish);
        summary.record_opened(GapDirection::Bullish);
        summary.record_expiry(ExpiryReason::Filled);
        summary.record_expiry(ExpiryReason::Aged);
        summary.record_invalid_bar();

        assert_eq!(summary.opened(), 3);
        assert_eq!(summary.bullish_opened, 2);
        assert_eq!(summary.expired(), 2);
        assert_eq!(summary.fill_rate(), 0.5);
        assert_eq!(summary.invalid_bars, 1);
    }

    #[test]
    fn test_position_verification() {
        let mut state = TrackerState::default();
        assert_eq!(
            PositionVerification::verify(&state, &Bar::new(7, 1.0, 0.5)),
            PositionVerification::Fresh
        );

        state.last_index = Some(9);
        assert_eq!(
            PositionVerification::verify(&state, &Bar::new(10, 1.0, 0.5)),
            PositionVerification::Exact
        );

        let gap = PositionVerification::verify(&state, &Bar::new(14, 1.0, 0.5));
        assert!(gap.has_gap());
        assert_eq!(
            gap,
            PositionVerification::Gap {
                expected_index: 10,
                actual_index: 14,
                missing_count: 4,
            }
        );

        let overlap = PositionVerification::verify(&state, &Bar::new(9, 1.0, 0.5));
        assert!(!overlap.can_continue());
        assert!(!overlap.has_gap());
    }

    #[test]
    fn test_library_version() {
        assert!(Checkpoint::library_version().contains('.'));
    }
}
