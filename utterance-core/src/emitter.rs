//! Sanitizing emitter and the pending-specials queue
//!
//! Wraps the chunker: strips residual control sentinels from emitted text
//! and reattaches queued special payloads to the `special`-reason chunks
//! that represent them, strictly in arrival order.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::chunker::{Chunker, EmitReason, OutputChunk};
use crate::classify::{FLUSH, SPECIAL};
use crate::config::Config;
use crate::error::Result;

/// FIFO of payloads travelling alongside SPECIAL sentinels
///
/// One entry is enqueued per upstream special token and one dequeued per
/// `special`-reason chunk. Underflow yields `None`, never an error.
#[derive(Debug, Default)]
pub struct PendingSpecials {
    queue: VecDeque<String>,
}

impl PendingSpecials {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a payload
    pub fn enqueue(&mut self, payload: String) {
        self.queue.push_back(payload);
    }

    /// Take the oldest payload, if any
    pub fn dequeue(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Number of undelivered payloads
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether all payloads have been delivered
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Strip residual control sentinels and surrounding whitespace
pub fn sanitize(text: &str) -> String {
    text.replace(SPECIAL, "")
        .replace(FLUSH, "")
        .trim()
        .to_string()
}

/// A sanitized chunk with its resolved special payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedChunk {
    /// Sanitized chunk text
    pub text: String,
    /// Payload reattached from the pending-specials queue
    pub special: Option<String>,
    /// Emission trigger
    pub reason: EmitReason,
}

/// Chunker front end that injects sentinels and resolves payloads
pub struct Emitter {
    chunker: Chunker,
    specials: PendingSpecials,
}

impl Emitter {
    /// Create an emitter with a fresh chunker
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            chunker: Chunker::new(config)?,
            specials: PendingSpecials::new(),
        })
    }

    /// Feed literal text
    pub fn push_literal(&mut self, text: &str) -> Vec<ResolvedChunk> {
        let chunks = self.chunker.push(text);
        self.resolve_chunks(chunks)
    }

    /// Enqueue a special payload and inject its sentinel into the stream
    pub fn push_special(&mut self, payload: impl Into<String>) -> Vec<ResolvedChunk> {
        self.specials.enqueue(payload.into());
        let chunks = self.chunker.push(&SPECIAL.to_string());
        self.resolve_chunks(chunks)
    }

    /// Inject an explicit flush point
    pub fn push_flush(&mut self) -> Vec<ResolvedChunk> {
        let chunks = self.chunker.push(&FLUSH.to_string());
        self.resolve_chunks(chunks)
    }

    /// Terminate the stream and resolve the terminal flush, if any
    pub fn finish(&mut self) -> Vec<ResolvedChunk> {
        let chunks = self.chunker.finish();
        self.resolve_chunks(chunks)
    }

    /// Payloads not yet delivered to a `special` chunk
    pub fn pending_specials(&self) -> usize {
        self.specials.len()
    }

    fn resolve_chunks(&mut self, chunks: Vec<OutputChunk>) -> Vec<ResolvedChunk> {
        chunks
            .into_iter()
            .map(|chunk| {
                let special = if chunk.reason == EmitReason::Special {
                    self.specials.dequeue()
                } else {
                    None
                };
                ResolvedChunk {
                    text: sanitize(&chunk.text),
                    special,
                    reason: chunk.reason,
                }
            })
            .collect()
    }
}
