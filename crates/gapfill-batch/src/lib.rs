//! Batch fill ratio computation across instruments
//!
//! Each instrument owns its own tracker; trackers share no state, so symbols
//! are processed in parallel with rayon while every individual series is
//! folded strictly in order.

pub mod engine;

// Re-export commonly used types
pub use engine::{BatchConfig, BatchEngine, BatchError, SymbolResult};
