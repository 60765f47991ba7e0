//! Three-bar fair value gap detection
//!
//! A gap exists at bar `i` when the range of bar `i` does not reach the range
//! of bar `i-2`. Bar `i-1` is the displacement candle and does not enter the
//! formula.

use crate::types::{GapCandidate, GapDirection, Interval};

/// Detect a gap between the range two bars back and the current range
///
/// Bullish takes priority: `low[i] > high[i-2]` gives `[high[i-2], low[i]]`.
/// Otherwise `high[i] < low[i-2]` gives the bearish gap `[high[i], low[i-2]]`.
pub fn detect_gap(two_back: &Interval, current: &Interval) -> Option<GapCandidate> {
    if current.low > two_back.high {
        Some(GapCandidate {
            direction: GapDirection::Bullish,
            low: two_back.high,
            high: current.low,
        })
    } else if current.high < two_back.low {
        Some(GapCandidate {
            direction: GapDirection::Bearish,
            low: current.high,
            high: two_back.low,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullish_gap() {
        let gap = detect_gap(&Interval::new(95.0, 100.0), &Interval::new(110.0, 115.0)).unwrap();
        assert_eq!(gap.direction, GapDirection::Bullish);
        assert_eq!((gap.low, gap.high), (100.0, 110.0));
    }

    #[test]
    fn test_bearish_gap() {
        let gap = detect_gap(&Interval::new(100.0, 105.0), &Interval::new(90.0, 96.0)).unwrap();
        assert_eq!(gap.direction, GapDirection::Bearish);
        assert_eq!((gap.low, gap.high), (96.0, 100.0));
    }

    #[test]
    fn test_touching_ranges_are_not_gaps() {
        // low[i] == high[i-2]
        assert!(detect_gap(&Interval::new(95.0, 100.0), &Interval::new(100.0, 104.0)).is_none());
        // high[i] == low[i-2]
        assert!(detect_gap(&Interval::new(100.0, 105.0), &Interval::new(96.0, 100.0)).is_none());
    }

    #[test]
    fn test_overlapping_ranges() {
        assert!(detect_gap(&Interval::new(95.0, 100.0), &Interval::new(98.0, 102.0)).is_none());
    }

    #[test]
    fn test_candidate_always_has_extent() {
        let cases = [
            (Interval::new(1.0, 2.0), Interval::new(2.5, 3.0)),
            (Interval::new(5.0, 6.0), Interval::new(1.0, 4.0)),
        ];
        for (two_back, current) in cases {
            let gap = detect_gap(&two_back, &current).unwrap();
            assert!(gap.bounds().has_extent());
        }
    }
}
