//! Coverage accumulation for an active gap
//!
//! Two accumulation modes are available:
//!
//! - **Envelope** (default): the smallest contiguous interval containing every
//!   overlap seen so far. A bar touching both edges of the gap without trading
//!   its middle still counts as covering the whole span between them. This
//!   matches the reference feature values bit for bit.
//! - **Union**: the exact union of overlaps, kept as sorted disjoint segments.
//!   Costs `O(k)` per bar for `k` segments and yields lower ratios whenever
//!   fills are non-contiguous.

use crate::types::Interval;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Sorted, disjoint covered segments
pub type Segments = SmallVec<[Interval; 4]>;

/// How traded overlaps are accumulated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoverageMode {
    #[default]
    Envelope,
    Union,
}

/// Grow `envelope` by the part of `bar` that trades inside `gap`
///
/// Overlaps of zero width (a bar touching a gap edge) leave the envelope
/// unchanged.
pub fn merge_envelope(
    envelope: Option<Interval>,
    bar: &Interval,
    gap: &Interval,
) -> Option<Interval> {
    match bar.overlap(gap) {
        Some(overlap) => Some(match envelope {
            None => overlap,
            Some(env) => Interval::new(env.low.min(overlap.low), env.high.max(overlap.high)),
        }),
        None => envelope,
    }
}

/// Insert `overlap` into sorted disjoint `segments`, merging anything it
/// overlaps or touches
pub fn merge_segment(segments: &mut Segments, overlap: Interval) {
    let mut merged = overlap;
    let mut inserted = false;
    let mut out = Segments::new();

    for seg in segments.iter() {
        if seg.high < merged.low {
            out.push(*seg);
        } else if seg.low > merged.high {
            if !inserted {
                out.push(merged);
                inserted = true;
            }
            out.push(*seg);
        } else {
            merged.low = merged.low.min(seg.low);
            merged.high = merged.high.max(seg.high);
        }
    }
    if !inserted {
        out.push(merged);
    }

    *segments = out;
}

/// Covered region of the active gap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Coverage {
    Envelope { envelope: Option<Interval> },
    Union { segments: Segments },
}

impl Coverage {
    /// Nothing covered yet
    pub fn empty(mode: CoverageMode) -> Self {
        match mode {
            CoverageMode::Envelope => Coverage::Envelope { envelope: None },
            CoverageMode::Union => Coverage::Union {
                segments: Segments::new(),
            },
        }
    }

    pub fn mode(&self) -> CoverageMode {
        match self {
            Coverage::Envelope { .. } => CoverageMode::Envelope,
            Coverage::Union { .. } => CoverageMode::Union,
        }
    }

    /// Account for a bar's traded range against the gap bounds
    pub fn absorb(&mut self, bar: &Interval, gap: &Interval) {
        match self {
            Coverage::Envelope { envelope } => {
                *envelope = merge_envelope(*envelope, bar, gap);
            }
            Coverage::Union { segments } => {
                if let Some(overlap) = bar.overlap(gap) {
                    merge_segment(segments, overlap);
                }
            }
        }
    }

    /// Total covered price distance
    pub fn covered_size(&self) -> f64 {
        match self {
            Coverage::Envelope { envelope } => envelope.map_or(0.0, |env| env.size().max(0.0)),
            Coverage::Union { segments } => segments.iter().map(|s| s.size().max(0.0)).sum(),
        }
    }

    /// Smallest interval containing all coverage
    pub fn extent(&self) -> Option<Interval> {
        match self {
            Coverage::Envelope { envelope } => *envelope,
            Coverage::Union { segments } => match (segments.first(), segments.last()) {
                (Some(first), Some(last)) => Some(Interval::new(first.low, last.high)),
                _ => None,
            },
        }
    }

    /// Ordered, disjoint and inside `gap`
    pub fn is_consistent_with(&self, gap: &Interval) -> bool {
        match self {
            Coverage::Envelope { envelope } => envelope.map_or(true, |env| env.is_within(gap)),
            Coverage::Union { segments } => {
                segments.iter().all(|s| s.is_within(gap))
                    && segments.windows(2).all(|w| w[0].high < w[1].low)
            }
        }
    }
}
