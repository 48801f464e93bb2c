//! Async token-to-segment pipeline for streaming TTS input
//!
//! Translates a typed token stream (`literal` / `special` / `flush`) into
//! the sentinel-annotated character stream the `utterance-core` chunker
//! consumes, and wraps emitted chunks into addressable, timestamped
//! [`OutputSegment`]s delivered strictly in emission order.
//!
//! The pipeline runs as two cooperating tasks joined by a bounded channel:
//! token translation (producer) and chunk consumption (consumer). The
//! bound provides backpressure so memory stays independent of stream
//! length. One pipeline instance serves one input stream; nothing is
//! shared across streams.
//!
//! # Example
//!
//! ```rust
//! use futures::stream;
//! use utterance_stream::{segment_stream, StreamMeta, StreamOptions, TextToken};
//!
//! let rt = tokio::runtime::Builder::new_current_thread()
//!     .enable_all()
//!     .build()
//!     .unwrap();
//! rt.block_on(async {
//!     let tokens = stream::iter(vec![
//!         Ok(TextToken::Literal("Hello there. ".to_string())),
//!         Ok(TextToken::Literal("General Kenobi!".to_string())),
//!     ]);
//!     let meta = StreamMeta {
//!         stream_id: "s1".to_string(),
//!         intent_id: "i1".to_string(),
//!     };
//!     let mut rx = segment_stream(tokens, meta, StreamOptions::default());
//!     let mut texts = Vec::new();
//!     while let Some(segment) = rx.recv().await {
//!         texts.push(segment.unwrap().text);
//!     }
//!     assert_eq!(texts, ["Hello there.", "General Kenobi!"]);
//! });
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod pipeline;
pub mod segment;

pub use error::{Result, StreamError};
pub use pipeline::{
    drive_chunks, segment_stream, ChunkHandler, StreamOptions, DEFAULT_CHANNEL_CAPACITY,
};
pub use segment::{OutputSegment, StreamMeta, TextToken};

// Re-export the core types that appear in this crate's public API.
pub use utterance_core::{Config, EmitReason, ResolvedChunk};
