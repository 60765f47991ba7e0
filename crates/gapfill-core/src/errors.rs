//! Processing error types

use thiserror::Error;

/// Processing errors
///
/// Bad bar values are never errors (they are absorbed as "no effect this
/// bar"). Only misuse of the calling convention is reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("Bars not sorted at position {position}: prev_index={prev_index}, curr_index={curr_index}")]
    UnsortedBars {
        position: usize,
        prev_index: usize,
        curr_index: usize,
    },

    #[error("Bar index {index} does not follow last processed index {last_index}")]
    StaleBar { last_index: usize, index: usize },

    #[error("High/low length mismatch: high has {high_len} values, low has {low_len}")]
    LengthMismatch { high_len: usize, low_len: usize },

    #[error("Invalid max lifetime: {max_lifetime} bars. Must be at least 1")]
    InvalidLifetime { max_lifetime: usize },
}
