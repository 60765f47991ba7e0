//! Large-scale bar generators for integration tests and benchmarks
//!
//! All generators are pure: same parameters, same bars. Patterns are
//! mathematical functions, no randomness.

use crate::types::Bar;

/// Oscillating series with periodic displacement candles
///
/// A sine wave around `base_price` with bar ranges of `width`. Every
/// `jump_every` bars the price displaces by `3 * width` in alternating
/// direction, which opens a fair value gap that the oscillation later trades
/// back into, so the series exercises fills, partial fills and age expiry.
pub fn oscillating_bars(count: usize, base_price: f64, width: f64, jump_every: usize) -> Vec<Bar> {
    let mut offset = 0.0;
    (0..count)
        .map(|i| {
            if jump_every > 0 && i > 0 && i % jump_every == 0 {
                let direction = if (i / jump_every) % 2 == 0 { -1.0 } else { 1.0 };
                offset += direction * 3.0 * width;
            }
            let mid = base_price + offset + (i as f64 / 7.0).sin() * width * 2.5;
            let half = width * (0.5 + 0.25 * ((i % 5) as f64 / 4.0));
            Bar::new(i, mid + half, mid - half)
        })
        .collect()
}

/// Replace every `every`-th bar's prices with NaN (missing data)
pub fn with_missing(mut bars: Vec<Bar>, every: usize) -> Vec<Bar> {
    if every == 0 {
        return bars;
    }
    for bar in bars.iter_mut().skip(every - 1).step_by(every) {
        bar.high = f64::NAN;
        bar.low = f64::NAN;
    }
    bars
}

/// Same shape as [`oscillating_bars`] shifted to a different price level,
/// one series per symbol
pub fn multi_symbol_series(symbols: &[&str], count: usize) -> Vec<(String, Vec<Bar>)> {
    symbols
        .iter()
        .enumerate()
        .map(|(k, symbol)| {
            let base = 100.0 * (k + 1) as f64;
            let width = 0.5 + k as f64 * 0.25;
            (
                symbol.to_string(),
                oscillating_bars(count, base, width, 17 + k * 4),
            )
        })
        .collect()
}
