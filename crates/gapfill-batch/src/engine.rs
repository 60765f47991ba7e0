//! Batch engine: one tracker per instrument, instruments in parallel

use gapfill_config::Settings;
use gapfill_core::{
    Bar, Checkpoint, CheckpointError, FillRatioSeries, GapLifecycleTracker, LifecycleSummary,
    ProcessingError, TrackerConfig,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

/// Configuration for batch operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Tracker configuration applied to every symbol
    pub tracker: TrackerConfig,

    /// Number of parallel threads; `None` uses the global rayon pool
    pub parallel_threads: Option<usize>,

    /// Order results by symbol (HashMap iteration order otherwise)
    pub sort_results: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            parallel_threads: None,
            sort_results: true,
        }
    }
}

impl BatchConfig {
    /// Derive batch configuration from loaded settings
    pub fn from_settings(settings: &Settings) -> Result<Self, BatchError> {
        let tracker = settings
            .tracker
            .to_tracker_config(None)
            .map_err(|message| BatchError::InvalidConfig { message })?;

        Ok(Self {
            tracker,
            parallel_threads: settings.batch.parallel_threads,
            sort_results: settings.batch.sort_results,
        })
    }
}

/// Output for one symbol
#[derive(Debug, Clone)]
pub struct SymbolResult {
    pub symbol: String,
    pub series: FillRatioSeries,
    pub summary: LifecycleSummary,

    /// State after the last bar, for continuing on the next chunk
    pub checkpoint: Checkpoint,
}

impl SymbolResult {
    pub fn bars_processed(&self) -> usize {
        self.series.len()
    }
}

/// Main batch engine
#[derive(Debug)]
pub struct BatchEngine {
    config: BatchConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Default for BatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchEngine {
    /// Create engine with default configuration on the global pool
    pub fn new() -> Self {
        Self {
            config: BatchConfig::default(),
            pool: None,
        }
    }

    /// Create engine with custom configuration
    ///
    /// Builds a dedicated thread pool when `parallel_threads` is set.
    pub fn with_config(config: BatchConfig) -> Result<Self, BatchError> {
        config.tracker.validate().map_err(|e| BatchError::InvalidConfig {
            message: e.to_string(),
        })?;

        let pool = match config.parallel_threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("gapfill-batch-{i}"))
                    .build()?,
            ),
            None => None,
        };

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Compute the fill ratio series for one symbol from a cold state
    pub fn compute_symbol(&self, symbol: &str, bars: &[Bar]) -> Result<SymbolResult, BatchError> {
        let tracker = GapLifecycleTracker::new(self.config.tracker).map_err(|source| {
            BatchError::Processing {
                symbol: symbol.to_string(),
                source,
            }
        })?;
        Self::run(symbol, tracker, bars)
    }

    /// Continue a symbol from an earlier checkpoint
    ///
    /// The checkpoint's own tracker configuration applies, not the engine's.
    pub fn resume_symbol(
        &self,
        checkpoint: Checkpoint,
        bars: &[Bar],
    ) -> Result<SymbolResult, BatchError> {
        let symbol = checkpoint.symbol.clone();
        let tracker = GapLifecycleTracker::from_checkpoint(checkpoint).map_err(|source| {
            BatchError::Checkpoint {
                symbol: symbol.clone(),
                source,
            }
        })?;
        Self::run(&symbol, tracker, bars)
    }

    /// Compute every symbol in parallel
    pub fn compute_symbols(
        &self,
        symbol_data: &HashMap<String, Vec<Bar>>,
    ) -> Result<Vec<SymbolResult>, BatchError> {
        if symbol_data.is_empty() {
            return Err(BatchError::NoSymbolData);
        }

        let total_bars: usize = symbol_data.values().map(Vec::len).sum();
        info!(
            symbols = symbol_data.len(),
            total_bars,
            max_lifetime = self.config.tracker.max_lifetime,
            "computing fill ratios"
        );

        let compute = || {
            symbol_data
                .par_iter()
                .map(|(symbol, bars)| self.compute_symbol(symbol, bars))
                .collect::<Result<Vec<_>, _>>()
        };
        let mut results = match &self.pool {
            Some(pool) => pool.install(compute)?,
            None => compute()?,
        };

        if self.config.sort_results {
            results.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        }

        Ok(results)
    }

    fn run(
        symbol: &str,
        mut tracker: GapLifecycleTracker,
        bars: &[Bar],
    ) -> Result<SymbolResult, BatchError> {
        let series = tracker.process_bars(bars).map_err(|source| BatchError::Processing {
            symbol: symbol.to_string(),
            source,
        })?;

        let summary = tracker.summary().clone();
        if summary.invalid_bars > 0 {
            warn!(
                %symbol,
                invalid_bars = summary.invalid_bars,
                "series contains invalid bars"
            );
        }

        Ok(SymbolResult {
            symbol: symbol.to_string(),
            series,
            summary,
            checkpoint: tracker.create_checkpoint(symbol),
        })
    }
}

/// Batch processing errors
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("No symbol data provided")]
    NoSymbolData,

    #[error("Processing failed for symbol {symbol}: {source}")]
    Processing {
        symbol: String,
        #[source]
        source: ProcessingError,
    },

    #[error("Checkpoint rejected for symbol {symbol}: {source}")]
    Checkpoint {
        symbol: String,
        #[source]
        source: CheckpointError,
    },

    #[error("Invalid batch configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use gapfill_core::fill_ratio_for_bars;
    use gapfill_core::test_utils::generators::{multi_symbol_series, with_missing};
    use gapfill_core::test_utils::scenarios;

    fn symbol_map(count: usize) -> HashMap<String, Vec<Bar>> {
        multi_symbol_series(&["BTCUSDT", "ETHUSDT", "EURUSD", "XAUUSD"], count)
            .into_iter()
            .collect()
    }

    #[test]
    fn test_empty_input_rejected() {
        let engine = BatchEngine::new();
        let err = engine.compute_symbols(&HashMap::new()).unwrap_err();
        assert!(matches!(err, BatchError::NoSymbolData));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let data = symbol_map(1_500);
        let engine = BatchEngine::new();
        let results = engine.compute_symbols(&data).unwrap();

        assert_eq!(results.len(), 4);
        for result in &results {
            let expected = fill_ratio_for_bars(&data[&result.symbol], TrackerConfig::default())
                .unwrap();
            assert_eq!(result.series, expected, "mismatch for {}", result.symbol);
            assert_eq!(result.bars_processed(), 1_500);
        }
    }

    #[test]
    fn test_results_sorted_by_symbol() {
        let engine = BatchEngine::with_config(BatchConfig {
            parallel_threads: Some(2),
            ..Default::default()
        })
        .unwrap();
        let results = engine.compute_symbols(&symbol_map(200)).unwrap();

        let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT", "EURUSD", "XAUUSD"]);
    }

    #[test]
    fn test_unsorted_symbol_reports_symbol() {
        let mut data = symbol_map(50);
        data.insert(
            "BROKEN".to_string(),
            vec![Bar::new(3, 1.0, 0.5), Bar::new(1, 1.0, 0.5)],
        );

        let err = BatchEngine::new().compute_symbols(&data).unwrap_err();
        match err {
            BatchError::Processing { symbol, source } => {
                assert_eq!(symbol, "BROKEN");
                assert!(matches!(source, ProcessingError::UnsortedBars { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_lifetime_rejected() {
        let err = BatchEngine::with_config(BatchConfig {
            tracker: TrackerConfig::new(0),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, BatchError::InvalidConfig { .. }));
    }

    #[test]
    fn test_invalid_bars_counted() {
        let data: HashMap<String, Vec<Bar>> = multi_symbol_series(&["EURUSD"], 300)
            .into_iter()
            .map(|(s, bars)| (s, with_missing(bars, 10)))
            .collect();

        let results = BatchEngine::new().compute_symbols(&data).unwrap();
        assert_eq!(results[0].summary.invalid_bars, 30);
        assert!(results[0]
            .series
            .ratios()
            .iter()
            .all(|r| (0.0..=1.0).contains(r)));
    }

    #[test]
    fn test_resume_symbol_continues_series() {
        let mut bars = scenarios::bullish_gap_100_110();
        bars.push(Bar::new(3, 108.0, 104.0));
        bars.push(Bar::new(4, 111.0, 95.0));

        let engine = BatchEngine::new();
        let head = engine.compute_symbol("EURUSD", &bars[..3]).unwrap();
        assert!(head.checkpoint.has_active_gap());

        let tail = engine.resume_symbol(head.checkpoint, &bars[3..]).unwrap();
        assert_eq!(tail.symbol, "EURUSD");
        assert!((tail.series.get(0).unwrap() - 0.4).abs() < 1e-12);
        assert_eq!(tail.series.get(1), Some(1.0));
        assert_eq!(tail.summary.filled, 1);
    }

    #[test]
    fn test_from_settings() {
        let mut settings = Settings::default();
        settings.tracker.default_max_lifetime = 45;
        settings.batch.parallel_threads = Some(1);

        let config = BatchConfig::from_settings(&settings).unwrap();
        assert_eq!(config.tracker.max_lifetime, 45);
        assert_eq!(config.parallel_threads, Some(1));

        settings.tracker.default_max_lifetime = 0;
        assert!(BatchConfig::from_settings(&settings).is_err());
    }
}
