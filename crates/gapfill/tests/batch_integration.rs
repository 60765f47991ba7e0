//! Multi-instrument batch computation through the meta crate

#![cfg(feature = "batch")]

use gapfill::core::test_utils::generators::multi_symbol_series;
use gapfill::{BatchConfig, BatchEngine, GapLifecycleTracker, Settings, TrackerConfig};
use std::collections::HashMap;

#[test]
fn test_batch_matches_per_symbol_tracker() {
    let data: HashMap<_, _> = multi_symbol_series(&["EURUSD", "XAUUSD", "BTCUSDT"], 2_500)
        .into_iter()
        .collect();

    let engine = BatchEngine::with_config(BatchConfig {
        tracker: TrackerConfig::new(20),
        parallel_threads: Some(3),
        sort_results: true,
    })
    .unwrap();
    let results = engine.compute_symbols(&data).unwrap();

    assert_eq!(results.len(), 3);
    for result in &results {
        let mut tracker = GapLifecycleTracker::with_max_lifetime(20).unwrap();
        let expected = tracker.process_bars(&data[&result.symbol]).unwrap();

        assert_eq!(result.series, expected);
        assert_eq!(result.series.name, "fvg_fill_ratio_20");
        assert_eq!(&result.summary, tracker.summary());
        assert_eq!(result.checkpoint.state, *tracker.state());
    }
}

#[test]
fn test_batch_from_default_settings() {
    let config = BatchConfig::from_settings(&Settings::default()).unwrap();
    assert_eq!(config.tracker, TrackerConfig::default());

    let engine = BatchEngine::with_config(config).unwrap();
    let data: HashMap<_, _> = multi_symbol_series(&["EURUSD"], 100).into_iter().collect();
    let results = engine.compute_symbols(&data).unwrap();

    assert_eq!(results[0].series.name, "fvg_fill_ratio_30");
}
