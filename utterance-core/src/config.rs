//! Chunking configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentError};

/// Thresholds steering the chunker's emission decisions
///
/// `boost` controls how many leading chunks are emitted eagerly on any
/// boundary to minimize time-to-first-audio. After the boost window, short
/// runs are extended to the next boundary instead of emitted, trading
/// latency for naturalness. The character bounds keep segment sizes stable
/// for long sentences and for CJK text where word counts are unreliable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of leading chunks emitted eagerly on any boundary
    pub boost: usize,
    /// Preferred lower bound on words per chunk
    pub minimum_words: usize,
    /// Upper bound on words per chunk before a limit emission
    pub maximum_words: usize,
    /// Lower bound on chunk length in characters
    pub minimum_chars: usize,
    /// Upper bound on chunk length in characters before a limit emission
    pub maximum_chars: usize,
    /// Minimum chunk length before the first emission
    ///
    /// Stricter than [`minimum_chars_after_first`](Self::minimum_chars_after_first)
    /// so the very first audible segment is not unnaturally short.
    pub minimum_chars_before_first: usize,
    /// Minimum chunk length once speech has started
    pub minimum_chars_after_first: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            boost: 2,
            minimum_words: 4,
            maximum_words: 12,
            minimum_chars: 12,
            maximum_chars: 64,
            minimum_chars_before_first: 20,
            minimum_chars_after_first: 11,
        }
    }
}

impl Config {
    /// Validate the configuration, failing fast on inconsistent bounds
    pub fn validate(&self) -> Result<()> {
        if self.minimum_words == 0 {
            return Err(SegmentError::InvalidConfig {
                reason: "minimum_words must be at least 1".to_string(),
            });
        }
        if self.minimum_words > self.maximum_words {
            return Err(SegmentError::InvalidConfig {
                reason: format!(
                    "minimum_words ({}) exceeds maximum_words ({})",
                    self.minimum_words, self.maximum_words
                ),
            });
        }
        if self.minimum_chars > self.maximum_chars {
            return Err(SegmentError::InvalidConfig {
                reason: format!(
                    "minimum_chars ({}) exceeds maximum_chars ({})",
                    self.minimum_chars, self.maximum_chars
                ),
            });
        }
        Ok(())
    }
}
