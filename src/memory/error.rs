//! Error types for native memory staging.

use thiserror::Error;

/// Errors that can occur while staging buffers into native memory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Failed to allocate {requested} bytes of native memory")]
    AllocationFailed { requested: usize },

    #[error("Staged region too small: need {needed} bytes, have {available}")]
    RegionTooSmall { needed: usize, available: usize },

    #[error("Staged size {0} does not fit in a wire integer")]
    TooLarge(usize),
}
