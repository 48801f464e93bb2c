//! Core error types

use thiserror::Error;

/// Errors raised by the segmentation core
#[derive(Error, Debug)]
pub enum SegmentError {
    /// Configuration rejected at construction time
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected
        reason: String,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, SegmentError>;
