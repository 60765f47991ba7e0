//! Gap lifecycle tracking
//!
//! Follows a single fair value gap from detection until it is filled or
//! ages out, emitting one fill ratio per bar. Each step is a pure function of
//! `(previous state, current bar)`; [`GapLifecycleTracker`] threads that state
//! through a bar sequence and adds ordering checks, counters and logging.
//!
//! Per bar, in index order:
//!
//! 1. An active gap absorbs the bar's range, reports `covered / gap_size`, and
//!    expires once filled, once `index - start_index >= max_lifetime`, or
//!    immediately if its size is not positive.
//! 2. An idle tracker (including one that just expired) looks for a new gap
//!    between bar `i-2` and bar `i`. The bar that opens a gap still reports
//!    the ratio from step 1; coverage starts accruing on the next bar.
//!
//! Candidates appearing while a gap is active are discarded, not queued.

use crate::checkpoint::{Checkpoint, CheckpointError, LifecycleSummary, PositionVerification};
use crate::coverage::{Coverage, CoverageMode};
use crate::detector::detect_gap;
use crate::errors::ProcessingError;
use crate::types::{Bar, FillRatioSample, FillRatioSeries, GapCandidate, GapDirection, Interval};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Default gap lifetime in bars (`fvg_fill_ratio_30`)
pub const DEFAULT_MAX_LIFETIME: usize = 30;

/// Tracker configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Bars a gap stays trackable, counted from its creation bar
    pub max_lifetime: usize,

    /// Coverage accumulation mode
    #[serde(default)]
    pub coverage_mode: CoverageMode,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_lifetime: DEFAULT_MAX_LIFETIME,
            coverage_mode: CoverageMode::Envelope,
        }
    }
}

impl TrackerConfig {
    pub fn new(max_lifetime: usize) -> Self {
        Self {
            max_lifetime,
            ..Default::default()
        }
    }

    pub fn with_coverage_mode(mut self, coverage_mode: CoverageMode) -> Self {
        self.coverage_mode = coverage_mode;
        self
    }

    pub fn validate(&self) -> Result<(), ProcessingError> {
        if self.max_lifetime == 0 {
            return Err(ProcessingError::InvalidLifetime {
                max_lifetime: self.max_lifetime,
            });
        }
        Ok(())
    }
}

/// The single gap currently being tracked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveGap {
    /// Diagnostic only; coverage math uses the bounds alone
    pub direction: GapDirection,

    pub gap_low: f64,
    pub gap_high: f64,

    /// Index of the bar that created the gap
    pub start_index: usize,

    pub coverage: Coverage,
}

impl ActiveGap {
    fn open(candidate: &GapCandidate, start_index: usize, mode: CoverageMode) -> Self {
        Self {
            direction: candidate.direction,
            gap_low: candidate.low,
            gap_high: candidate.high,
            start_index,
            coverage: Coverage::empty(mode),
        }
    }

    pub fn bounds(&self) -> Interval {
        Interval::new(self.gap_low, self.gap_high)
    }

    pub fn gap_size(&self) -> f64 {
        self.gap_high - self.gap_low
    }

    /// Width not positive, NaN, or overflowed to infinity
    pub fn is_degenerate(&self) -> bool {
        let size = self.gap_size();
        !(size > 0.0 && size.is_finite())
    }

    pub fn covered_low(&self) -> Option<f64> {
        self.coverage.extent().map(|c| c.low)
    }

    pub fn covered_high(&self) -> Option<f64> {
        self.coverage.extent().map(|c| c.high)
    }

    /// Bars elapsed since creation
    pub fn age(&self, index: usize) -> usize {
        index.saturating_sub(self.start_index)
    }

    /// Current fill ratio, `0.0` for degenerate gaps
    pub fn fill_ratio(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        (self.coverage.covered_size() / self.gap_size()).clamp(0.0, 1.0)
    }
}

/// Tracker phase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Active(ActiveGap),
}

impl Phase {
    pub fn active_gap(&self) -> Option<&ActiveGap> {
        match self {
            Phase::Idle => None,
            Phase::Active(gap) => Some(gap),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::Idle)
    }
}

/// Why an active gap stopped being tracked
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryReason {
    Filled,
    Aged,
    Degenerate,
}

/// Result of folding one bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub sample: FillRatioSample,

    /// The gap active before this bar expired on it
    pub expired: Option<ExpiryReason>,

    /// A new gap was opened on this bar
    pub opened: Option<GapCandidate>,
}

/// Complete fold state
///
/// Persisting this value after a prefix and resuming from it reproduces the
/// single-pass output exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TrackerState {
    pub phase: Phase,

    /// Ranges of bars `i-2` and `i-1` (in that order), `None` when absent or
    /// invalid
    pub lookback: [Option<Interval>; 2],

    pub last_index: Option<usize>,
}

impl TrackerState {
    /// Fold one bar into the state
    pub fn advance(&self, bar: &Bar, config: &TrackerConfig) -> (TrackerState, StepOutcome) {
        let range = bar.range();
        let mut phase = self.phase.clone();
        let mut ratio = 0.0;
        let mut expired = None;

        if let Phase::Active(gap) = &mut phase {
            // Invalid bars contribute no overlap but still age the gap
            if let Some(bar_range) = &range {
                let bounds = gap.bounds();
                gap.coverage.absorb(bar_range, &bounds);
            }

            ratio = gap.fill_ratio();
            expired = if gap.is_degenerate() {
                Some(ExpiryReason::Degenerate)
            } else if ratio >= 1.0 {
                Some(ExpiryReason::Filled)
            } else if gap.age(bar.index) >= config.max_lifetime {
                Some(ExpiryReason::Aged)
            } else {
                None
            };
        }

        if expired.is_some() {
            phase = Phase::Idle;
        }

        let mut opened = None;
        if phase.is_idle() {
            if let (Some(two_back), Some(current)) = (&self.lookback[0], &range) {
                if let Some(candidate) = detect_gap(two_back, current) {
                    phase = Phase::Active(ActiveGap::open(
                        &candidate,
                        bar.index,
                        config.coverage_mode,
                    ));
                    opened = Some(candidate);
                }
            }
        }

        let next = TrackerState {
            phase,
            lookback: [self.lookback[1], range],
            last_index: Some(bar.index),
        };
        let outcome = StepOutcome {
            sample: FillRatioSample {
                index: bar.index,
                ratio,
            },
            expired,
            opened,
        };
        (next, outcome)
    }
}

/// Per-bar record of an instrumented run
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub sample: FillRatioSample,

    /// Phase after the bar was folded
    pub phase: Phase,

    pub expired: Option<ExpiryReason>,
    pub opened: Option<GapCandidate>,
}

impl TraceEntry {
    /// Number of gaps alive after this bar (0 or 1)
    pub fn active_gap_count(&self) -> usize {
        usize::from(!self.phase.is_idle())
    }
}

/// Streaming fair value gap tracker with batch entry points
#[derive(Debug, Clone)]
pub struct GapLifecycleTracker {
    config: TrackerConfig,
    state: TrackerState,
    summary: LifecycleSummary,
}

impl GapLifecycleTracker {
    /// Create an idle tracker
    ///
    /// # Errors
    ///
    /// `ProcessingError::InvalidLifetime` when `max_lifetime` is zero.
    pub fn new(config: TrackerConfig) -> Result<Self, ProcessingError> {
        config.validate()?;
        Ok(Self {
            config,
            state: TrackerState::default(),
            summary: LifecycleSummary::default(),
        })
    }

    pub fn with_max_lifetime(max_lifetime: usize) -> Result<Self, ProcessingError> {
        Self::new(TrackerConfig::new(max_lifetime))
    }

    /// Process a single bar
    ///
    /// Bar indices must strictly increase across calls. Bad high/low values
    /// are absorbed (counted, no coverage, no detection), never reported.
    pub fn step(&mut self, bar: &Bar) -> Result<StepOutcome, ProcessingError> {
        if let Some(last_index) = self.state.last_index {
            if bar.index <= last_index {
                return Err(ProcessingError::StaleBar {
                    last_index,
                    index: bar.index,
                });
            }
        }
        Ok(self.fold(bar))
    }

    /// Process a slice of bars into an aligned fill ratio series
    ///
    /// Continues from the current state, so a tracker restored from a
    /// checkpoint picks up exactly where it left off. Ordering is validated
    /// for the whole slice before any bar is folded.
    pub fn process_bars(&mut self, bars: &[Bar]) -> Result<FillRatioSeries, ProcessingError> {
        self.validate_bar_ordering(bars)?;

        let samples = bars.iter().map(|bar| self.fold(bar).sample).collect();
        Ok(FillRatioSeries::new(self.config.max_lifetime, samples))
    }

    /// Like [`process_bars`](Self::process_bars), recording the phase after
    /// every bar
    pub fn process_with_trace(&mut self, bars: &[Bar]) -> Result<Vec<TraceEntry>, ProcessingError> {
        self.validate_bar_ordering(bars)?;

        Ok(bars
            .iter()
            .map(|bar| {
                let outcome = self.fold(bar);
                TraceEntry {
                    sample: outcome.sample,
                    phase: self.state.phase.clone(),
                    expired: outcome.expired,
                    opened: outcome.opened,
                }
            })
            .collect())
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn active_gap(&self) -> Option<&ActiveGap> {
        self.state.phase.active_gap()
    }

    pub fn summary(&self) -> &LifecycleSummary {
        &self.summary
    }

    /// Drop all state and counters, keeping the configuration
    ///
    /// Returns the gap that was active, if any.
    pub fn reset(&mut self) -> Option<ActiveGap> {
        let previous = std::mem::take(&mut self.state);
        self.summary = LifecycleSummary::default();
        match previous.phase {
            Phase::Active(gap) => Some(gap),
            Phase::Idle => None,
        }
    }

    // === CHECKPOINT METHODS ===

    /// Capture the fold state for later continuation
    pub fn create_checkpoint(&self, symbol: &str) -> Checkpoint {
        Checkpoint::new(
            symbol.to_string(),
            self.config,
            self.state.clone(),
            self.summary.clone(),
        )
    }

    /// Resume from a checkpoint
    ///
    /// # Errors
    ///
    /// Any structural problem reported by [`Checkpoint::validate`].
    pub fn from_checkpoint(checkpoint: Checkpoint) -> Result<Self, CheckpointError> {
        checkpoint.validate()?;
        debug!(
            symbol = %checkpoint.symbol,
            last_index = ?checkpoint.state.last_index,
            active = checkpoint.has_active_gap(),
            "resuming gap tracker from checkpoint"
        );

        Ok(Self {
            config: checkpoint.config,
            state: checkpoint.state,
            summary: checkpoint.summary,
        })
    }

    /// Check where `first_bar` sits relative to the last processed bar
    pub fn verify_position(&self, first_bar: &Bar) -> PositionVerification {
        PositionVerification::verify(&self.state, first_bar)
    }

    fn fold(&mut self, bar: &Bar) -> StepOutcome {
        let (next, outcome) = self.state.advance(bar, &self.config);
        self.state = next;

        if !bar.is_valid() {
            self.summary.record_invalid_bar();
            trace!(index = bar.index, high = bar.high, low = bar.low, "invalid bar absorbed");
        }
        if let Some(reason) = outcome.expired {
            self.summary.record_expiry(reason);
            debug!(index = bar.index, ?reason, ratio = outcome.sample.ratio, "gap expired");
        }
        if let Some(candidate) = &outcome.opened {
            self.summary.record_opened(candidate.direction);
            debug!(
                index = bar.index,
                direction = ?candidate.direction,
                low = candidate.low,
                high = candidate.high,
                "gap opened"
            );
        }

        outcome
    }

    fn validate_bar_ordering(&self, bars: &[Bar]) -> Result<(), ProcessingError> {
        let mut prev = self.state.last_index;
        for (position, bar) in bars.iter().enumerate() {
            if let Some(prev_index) = prev {
                if bar.index <= prev_index {
                    return Err(ProcessingError::UnsortedBars {
                        position,
                        prev_index,
                        curr_index: bar.index,
                    });
                }
            }
            prev = Some(bar.index);
        }
        Ok(())
    }
}

/// Fill ratio feature over positional high/low columns
///
/// The feature-library calling convention: whole columns in, one aligned
/// ratio column out, bar index = position.
pub fn compute_fill_ratio(
    high: &[f64],
    low: &[f64],
    config: TrackerConfig,
) -> Result<FillRatioSeries, ProcessingError> {
    if high.len() != low.len() {
        return Err(ProcessingError::LengthMismatch {
            high_len: high.len(),
            low_len: low.len(),
        });
    }

    let bars: Vec<Bar> = high
        .iter()
        .zip(low)
        .enumerate()
        .map(|(index, (&h, &l))| Bar::new(index, h, l))
        .collect();

    fill_ratio_for_bars(&bars, config)
}

/// Fill ratio feature over a bar slice, starting from a cold idle state
pub fn fill_ratio_for_bars(
    bars: &[Bar],
    config: TrackerConfig,
) -> Result<FillRatioSeries, ProcessingError> {
    GapLifecycleTracker::new(config)?.process_bars(bars)
}
