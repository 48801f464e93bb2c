//! Streaming chunker state machine
//!
//! Consumes a grapheme sequence and produces bounded-size, speech-ready
//! chunks. The machine keeps only the current uncommitted buffer and the
//! current committed chunk, so memory stays bounded regardless of total
//! stream length. Emission is driven by several interacting triggers:
//! hard punctuation and flush sentinels always emit, word/char limits emit
//! with an overflow guard, and the boost window forces the first chunks out
//! early on any boundary.

use std::collections::VecDeque;
use std::mem;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::classify::{resolve, GraphemeClass, SPECIAL};
use crate::config::Config;
use crate::error::Result;

/// Why a chunk was emitted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitReason {
    /// Emitted eagerly inside the boost window
    Boost,
    /// Word or character limit reached
    Limit,
    /// Hard punctuation boundary
    Hard,
    /// Explicit flush point or end of stream
    Flush,
    /// Carries a pending special payload
    Special,
}

/// A committed, speech-ready fragment of the input stream
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputChunk {
    /// Chunk text; may still carry residual sentinels until sanitized
    pub text: String,
    /// Word-like token count contributed by the folded buffers
    pub words: usize,
    /// Emission trigger
    pub reason: EmitReason,
}

/// Maximum graphemes of lookahead the classifier may request
const LOOKAHEAD: usize = 2;

/// Incremental segmentation state machine
///
/// Create one instance per input stream; feed text with [`push`](Self::push)
/// and terminate with [`finish`](Self::finish). State is never shared across
/// streams, and re-running the same input through a fresh instance yields an
/// identical chunk sequence.
pub struct Chunker {
    config: Config,
    /// Raw text tail whose final grapheme cluster may still grow
    tail: String,
    /// Decoded graphemes waiting for enough lookahead
    pending: VecDeque<String>,
    /// Uncommitted grapheme run since the last boundary decision
    buffer: String,
    /// Text committed toward the next emission
    chunk: String,
    chunk_words: usize,
    yield_count: usize,
    previous: Option<String>,
    finished: bool,
}

impl Chunker {
    /// Create a chunker, validating the configuration up front
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tail: String::new(),
            pending: VecDeque::new(),
            buffer: String::new(),
            chunk: String::new(),
            chunk_words: 0,
            yield_count: 0,
            previous: None,
            finished: false,
        })
    }

    /// Feed a piece of input text, returning any chunks that became ready
    ///
    /// Pieces may split grapheme clusters arbitrarily; the trailing cluster
    /// is held back until the next piece proves it complete.
    pub fn push(&mut self, text: &str) -> Vec<OutputChunk> {
        let mut out = Vec::new();
        if self.finished || text.is_empty() {
            return out;
        }

        let raw = mem::take(&mut self.tail) + text;
        let mut clusters = raw.graphemes(true).peekable();
        while let Some(cluster) = clusters.next() {
            if clusters.peek().is_some() {
                self.pending.push_back(cluster.to_string());
            } else {
                self.tail = cluster.to_string();
            }
        }

        self.drain(&mut out);
        out
    }

    /// Signal end of input, flushing all held-back state
    ///
    /// Emits a terminal `flush` chunk if any text remains uncommitted.
    /// Subsequent calls return nothing.
    pub fn finish(&mut self) -> Vec<OutputChunk> {
        let mut out = Vec::new();
        if self.finished {
            return out;
        }
        self.finished = true;

        let tail = mem::take(&mut self.tail);
        for cluster in tail.graphemes(true) {
            self.pending.push_back(cluster.to_string());
        }
        self.drain(&mut out);

        if !self.chunk.is_empty() || !self.buffer.is_empty() {
            let text = format!("{}{}", self.chunk, self.buffer)
                .trim()
                .to_string();
            let words = self.chunk_words + count_words(&self.buffer);
            out.push(OutputChunk {
                text,
                words,
                reason: EmitReason::Flush,
            });
        }
        self.chunk.clear();
        self.buffer.clear();
        self.chunk_words = 0;
        out
    }

    /// Process graphemes that have their full lookahead margin available
    fn drain(&mut self, out: &mut Vec<OutputChunk>) {
        while self.pending.len() > LOOKAHEAD || (self.finished && !self.pending.is_empty()) {
            self.step(out);
        }
    }

    fn step(&mut self, out: &mut Vec<OutputChunk>) {
        let grapheme = match self.pending.pop_front() {
            Some(grapheme) => grapheme,
            None => return,
        };
        let resolution = resolve(
            &grapheme,
            self.previous.as_deref(),
            self.pending.front().map(String::as_str),
            self.pending.get(1).map(String::as_str),
        );
        for _ in 0..resolution.consumed {
            self.pending.pop_front();
        }

        if resolution.class.is_boundary() {
            self.boundary(resolution.grapheme, resolution.class, out);
        } else {
            self.buffer.push_str(&resolution.grapheme);
            self.previous = Some(resolution.grapheme);
        }
    }

    /// Handle one boundary-classified grapheme
    fn boundary(&mut self, grapheme: String, class: GraphemeClass, out: &mut Vec<OutputChunk>) {
        let special = matches!(class, GraphemeClass::Special);
        let flush = matches!(class, GraphemeClass::Flush);
        let hard = matches!(class, GraphemeClass::Hard { .. });
        let kept = matches!(class, GraphemeClass::Hard { kept: true });

        if self.buffer.is_empty() {
            // A leading or back-to-back boundary carries no text. Specials
            // still pass through so payload order is preserved.
            if special {
                out.push(OutputChunk {
                    text: String::new(),
                    words: 0,
                    reason: EmitReason::Special,
                });
                self.yield_count += 1;
                self.chunk_words = 0;
            }
            self.previous = Some(grapheme);
            return;
        }

        let words_in_buffer = count_words(&self.buffer);

        // Overflow guard: folding the buffer in would overshoot the word
        // limit, so the committed chunk goes out before the fold.
        if self.chunk_words > self.config.minimum_words
            && self.chunk_words + words_in_buffer > self.config.maximum_words
        {
            let mut text = self.chunk.trim().to_string();
            if kept {
                text.push_str(&grapheme);
            }
            out.push(OutputChunk {
                text,
                words: self.chunk_words,
                reason: EmitReason::Limit,
            });
            self.yield_count += 1;
            self.chunk.clear();
            self.chunk_words = 0;
        }

        self.chunk.push_str(&self.buffer);
        self.chunk.push_str(&grapheme);
        self.chunk_words += words_in_buffer;
        self.buffer.clear();

        let dynamic_min_chars = if self.yield_count > 0 {
            self.config.minimum_chars_after_first
        } else {
            self.config.minimum_chars_before_first
        };
        let dynamic_min_len = self.config.minimum_chars.max(dynamic_min_chars);
        let chunk_len = char_len(&self.chunk);

        if special {
            let text = self
                .chunk
                .strip_suffix(SPECIAL)
                .unwrap_or(&self.chunk)
                .trim()
                .to_string();
            out.push(OutputChunk {
                text,
                words: self.chunk_words,
                reason: EmitReason::Special,
            });
            self.yield_count += 1;
            self.chunk.clear();
            self.chunk_words = 0;
        } else if flush
            || hard
            || self.chunk_words > self.config.maximum_words
            || chunk_len > self.config.maximum_chars
            || self.yield_count < self.config.boost
        {
            // Past the boost window a short run is extended to the next
            // boundary instead of emitted.
            let extend = !flush
                && !hard
                && (chunk_len < dynamic_min_len
                    || self.chunk_words < self.config.minimum_words.min(3))
                && self.yield_count >= self.config.boost
                && chunk_len < self.config.maximum_chars;

            if !extend {
                let reason = if flush {
                    EmitReason::Flush
                } else if hard {
                    EmitReason::Hard
                } else if self.chunk_words > self.config.maximum_words
                    || chunk_len > self.config.maximum_chars
                {
                    EmitReason::Limit
                } else {
                    EmitReason::Boost
                };
                out.push(OutputChunk {
                    text: self.chunk.trim().to_string(),
                    words: self.chunk_words,
                    reason,
                });
                self.yield_count += 1;
                self.chunk.clear();
                self.chunk_words = 0;
            }
        }

        self.previous = Some(grapheme);
    }
}

/// Count word-like tokens, the unit all word thresholds are measured in
pub(crate) fn count_words(text: &str) -> usize {
    text.unicode_words().count()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Segment a complete text in one call
///
/// Convenience wrapper over [`Chunker`] for non-streaming inputs.
pub fn segment_text(text: &str, config: Config) -> Result<Vec<OutputChunk>> {
    let mut chunker = Chunker::new(config)?;
    let mut chunks = chunker.push(text);
    chunks.extend(chunker.finish());
    Ok(chunks)
}
