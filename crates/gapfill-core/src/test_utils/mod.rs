//! Test utilities for consistent bar fixtures across the workspace
//!
//! ## Module Organization
//!
//! - `mod.rs`: Small hand-written scenarios and a bar builder
//! - `generators.rs`: Larger deterministic series for integration tests and benches

pub mod generators;

use crate::types::Bar;

/// Builder for bar sequences with consecutive indices
pub struct BarBuilder {
    next_index: usize,
    bars: Vec<Bar>,
}

impl Default for BarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BarBuilder {
    pub fn new() -> Self {
        Self {
            next_index: 0,
            bars: Vec::new(),
        }
    }

    /// First index to assign (for chunks that continue a series)
    pub fn starting_at(mut self, index: usize) -> Self {
        self.next_index = index;
        self
    }

    pub fn bar(mut self, low: f64, high: f64) -> Self {
        self.bars.push(Bar::new(self.next_index, high, low));
        self.next_index += 1;
        self
    }

    /// `count` identical bars
    pub fn flat(mut self, count: usize, low: f64, high: f64) -> Self {
        for _ in 0..count {
            self = self.bar(low, high);
        }
        self
    }

    /// Bar with NaN high/low
    pub fn missing(self) -> Self {
        self.bar(f64::NAN, f64::NAN)
    }

    pub fn build(self) -> Vec<Bar> {
        self.bars
    }
}

/// Common test scenarios
pub mod scenarios {
    use super::*;

    /// Bullish gap `[100, 110]` opened at index 2 (`low[2]=110 > high[0]=100`)
    pub fn bullish_gap_100_110() -> Vec<Bar> {
        BarBuilder::new()
            .bar(95.0, 100.0)
            .bar(99.0, 108.0)
            .bar(110.0, 115.0)
            .build()
    }

    /// Flat bars until `start`, then a staircase rising 10 per bar
    ///
    /// The gap opened at `start` (requires `start >= 2`) is never traded
    /// back into, and every later bar would qualify as a new bullish gap on
    /// its own.
    pub fn unfilled_gap_at(start: usize, len: usize) -> Vec<Bar> {
        let mut builder = BarBuilder::new().flat(start.min(len), 99.0, 101.0);
        for k in 1..=len.saturating_sub(start) {
            let low = 101.0 + 10.0 * k as f64;
            builder = builder.bar(low, low + 2.0);
        }
        builder.build()
    }

    /// Flat series that never produces a gap
    pub fn no_gap_sequence(len: usize) -> Vec<Bar> {
        BarBuilder::new().flat(len, 99.0, 101.0).build()
    }
}
