//! Streaming utterance segmentation for text-to-speech pipelines
//!
//! Splits an incrementally produced text stream (for example, tokens
//! emitted by a language model) into bounded-size, speech-ready fragments.
//! The goal is to minimize time-to-first-audio without producing
//! unnaturally short, choppy utterances, while handling punctuation
//! semantics, numerals, Unicode grapheme boundaries (including emoji), and
//! in-band control sentinels.
//!
//! # Architecture
//!
//! - **Classifier** ([`classify`]): maps one grapheme, with bounded
//!   lookahead, to a punctuation class or control sentinel.
//! - **Chunker** ([`Chunker`]): the segmentation state machine. Feed text
//!   with [`Chunker::push`], terminate with [`Chunker::finish`].
//! - **Emitter** ([`Emitter`]): sanitizes chunk text and reattaches
//!   queued special payloads in FIFO order.
//!
//! Memory stays bounded regardless of stream length: only the current
//! uncommitted buffer, the current committed chunk, and a two-grapheme
//! lookahead margin are retained.
//!
//! # Example
//!
//! ```rust
//! use utterance_core::{segment_text, Config};
//!
//! let chunks = segment_text("Hello world. How are you today?", Config::default()).unwrap();
//! let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
//! assert_eq!(texts, ["Hello world.", "How are you today?"]);
//! ```

#![warn(missing_docs)]

pub mod chunker;
pub mod classify;
pub mod config;
pub mod emitter;
pub mod error;

pub use chunker::{segment_text, Chunker, EmitReason, OutputChunk};
pub use classify::{classify, GraphemeClass, FLUSH, SPECIAL};
pub use config::Config;
pub use emitter::{sanitize, Emitter, PendingSpecials, ResolvedChunk};
pub use error::{Result, SegmentError};
