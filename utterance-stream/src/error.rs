//! Pipeline error types

use thiserror::Error;
use utterance_core::SegmentError;

/// Errors surfaced on the segment stream
#[derive(Error, Debug)]
pub enum StreamError {
    /// Core segmentation error
    #[error(transparent)]
    Core(#[from] SegmentError),

    /// The token source failed; the pipeline aborts without salvaging
    /// partial buffers
    #[error("upstream read failed: {0}")]
    Upstream(String),

    /// The per-chunk handler failed
    #[error("segment handler failed: {0}")]
    Handler(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, StreamError>;
