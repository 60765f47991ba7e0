//! Type definitions for gap lifecycle tracking

use serde::{Deserialize, Serialize};

/// Closed price interval `[low, high]`
///
/// Used for bar ranges, gap bounds and covered regions alike.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Width of the interval (negative for inverted bounds)
    pub fn size(&self) -> f64 {
        self.high - self.low
    }

    /// Strictly positive width
    pub fn has_extent(&self) -> bool {
        self.high > self.low
    }

    /// Intersection with `other`, `None` unless it has positive width
    pub fn overlap(&self, other: &Interval) -> Option<Interval> {
        let low = self.low.max(other.low);
        let high = self.high.min(other.high);
        if high > low {
            Some(Interval { low, high })
        } else {
            None
        }
    }

    /// `self` lies within `outer` (bounds inclusive)
    pub fn is_within(&self, outer: &Interval) -> bool {
        self.low >= outer.low && self.high <= outer.high && self.low <= self.high
    }
}

/// Price bar as consumed by the tracker
///
/// Only the traded range matters here; open/close/volume are owned by the
/// surrounding feature library.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    /// Position in the series (strictly increasing)
    pub index: usize,

    /// Highest traded price
    pub high: f64,

    /// Lowest traded price
    pub low: f64,
}

impl Bar {
    pub fn new(index: usize, high: f64, low: f64) -> Self {
        Self { index, high, low }
    }

    /// Finite prices with `high >= low`
    ///
    /// Missing values arrive as NaN and fail this check.
    pub fn is_valid(&self) -> bool {
        self.high.is_finite() && self.low.is_finite() && self.high >= self.low
    }

    /// Traded range, `None` for invalid bars
    pub fn range(&self) -> Option<Interval> {
        self.is_valid().then(|| Interval::new(self.low, self.high))
    }
}

/// Side of a fair value gap
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GapDirection {
    /// Current low above the high two bars back
    Bullish,
    /// Current high below the low two bars back
    Bearish,
}

/// Freshly detected gap, before it becomes the active gap
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GapCandidate {
    pub direction: GapDirection,
    pub low: f64,
    pub high: f64,
}

impl GapCandidate {
    pub fn bounds(&self) -> Interval {
        Interval::new(self.low, self.high)
    }
}

/// Fill ratio emitted for one bar
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FillRatioSample {
    pub index: usize,

    /// Covered fraction of the tracked gap, in `[0, 1]`
    pub ratio: f64,
}

impl FillRatioSample {
    pub fn zero(index: usize) -> Self {
        Self { index, ratio: 0.0 }
    }
}

/// Feature name prefix used by the surrounding feature library
pub const FEATURE_PREFIX: &str = "fvg_fill_ratio";

/// Fill ratio output, aligned index-for-index with the input bars
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FillRatioSeries {
    /// Feature code, e.g. `fvg_fill_ratio_30`
    pub name: String,

    pub samples: Vec<FillRatioSample>,
}

impl FillRatioSeries {
    pub fn new(max_lifetime: usize, samples: Vec<FillRatioSample>) -> Self {
        Self {
            name: feature_name(max_lifetime),
            samples,
        }
    }

    /// Plain ratio column
    pub fn ratios(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.ratio).collect()
    }

    pub fn get(&self, position: usize) -> Option<f64> {
        self.samples.get(position).map(|s| s.ratio)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Feature code for a given lifetime
pub fn feature_name(max_lifetime: usize) -> String {
    format!("{}_{}", FEATURE_PREFIX, max_lifetime)
}
