//! Two-stage segmentation pipeline
//!
//! A producer task forwards the typed token stream into a bounded channel
//! while a consumer task owns the emitter and drives the chunk handler.
//! The channel bound makes a lagging consumer exert backpressure on token
//! arrival, keeping memory use independent of total stream length. All
//! chunker state transitions happen on the consumer side, so no locking is
//! needed.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use futures::{pin_mut, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error};
use utterance_core::{Config, Emitter, ResolvedChunk};

use crate::error::{Result, StreamError};
use crate::segment::{OutputSegment, StreamMeta, TextToken};

/// Default capacity of the internal token channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Pipeline tuning knobs
#[derive(Clone, Debug)]
pub struct StreamOptions {
    /// Chunker thresholds
    pub chunking: Config,
    /// Bounded capacity of the producer/consumer channel
    pub channel_capacity: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunking: Config::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Receives each resolved chunk in emission order
#[async_trait]
pub trait ChunkHandler: Send {
    /// Handle one chunk; the next chunk is not processed until this returns
    async fn handle(&mut self, chunk: ResolvedChunk) -> Result<()>;
}

/// Drive `tokens` through the chunker and into `handler`
///
/// Runs the token-translation stage and the chunk-consumption stage as two
/// cooperating tasks joined by a bounded channel. A handler failure is
/// logged and stops consumption without surfacing an error; an upstream
/// failure aborts with [`StreamError::Upstream`].
pub async fn drive_chunks<S, H>(tokens: S, options: StreamOptions, handler: &mut H) -> Result<()>
where
    S: Stream<Item = Result<TextToken>> + Send + 'static,
    H: ChunkHandler,
{
    let mut emitter = Emitter::new(options.chunking)?;
    let (tx, mut rx) = mpsc::channel::<Result<TextToken>>(options.channel_capacity);

    let producer = tokio::spawn(async move {
        pin_mut!(tokens);
        while let Some(item) = tokens.next().await {
            if tx.send(item).await.is_err() {
                // Consumer stopped; drop the rest of the stream.
                break;
            }
        }
    });

    let outcome = consume(&mut rx, &mut emitter, handler).await;
    drop(rx);
    let _ = producer.await;
    outcome
}

/// Consumer stage: all chunker state lives here
async fn consume<H: ChunkHandler>(
    rx: &mut mpsc::Receiver<Result<TextToken>>,
    emitter: &mut Emitter,
    handler: &mut H,
) -> Result<()> {
    while let Some(item) = rx.recv().await {
        let token = item?;
        let chunks = match token {
            TextToken::Literal(text) => emitter.push_literal(&text),
            TextToken::Special(payload) => emitter.push_special(payload),
            TextToken::Flush => emitter.push_flush(),
        };
        if !deliver(chunks, handler).await {
            return Ok(());
        }
    }
    let chunks = emitter.finish();
    deliver(chunks, handler).await;
    Ok(())
}

/// Returns false when the handler failed and consumption must stop
async fn deliver<H: ChunkHandler>(chunks: Vec<ResolvedChunk>, handler: &mut H) -> bool {
    for chunk in chunks {
        debug!(reason = ?chunk.reason, len = chunk.text.len(), "chunk ready");
        if let Err(err) = handler.handle(chunk).await {
            // A failing handler stops delivery; the stream itself still
            // ends cleanly.
            error!(%err, "segment handler failed; stopping stream");
            return false;
        }
    }
    true
}

/// Build an addressable segment stream from a token stream
///
/// Spawns the pipeline and returns the ordered receiver of output
/// segments. The stream ends after the terminal flush; an upstream failure
/// is delivered as a final `Err` item.
pub fn segment_stream<S>(
    tokens: S,
    meta: StreamMeta,
    options: StreamOptions,
) -> mpsc::Receiver<Result<OutputSegment>>
where
    S: Stream<Item = Result<TextToken>> + Send + 'static,
{
    let (out_tx, out_rx) = mpsc::channel(options.channel_capacity);
    tokio::spawn(async move {
        let mut sink = SegmentSink {
            meta,
            next_seq: 0,
            out: out_tx.clone(),
        };
        if let Err(err) = drive_chunks(tokens, options, &mut sink).await {
            let _ = out_tx.send(Err(err)).await;
        }
    });
    out_rx
}

/// Handler that wraps chunks into addressable, timestamped segments
struct SegmentSink {
    meta: StreamMeta,
    next_seq: u64,
    out: mpsc::Sender<Result<OutputSegment>>,
}

#[async_trait]
impl ChunkHandler for SegmentSink {
    async fn handle(&mut self, chunk: ResolvedChunk) -> Result<()> {
        let segment = OutputSegment {
            stream_id: self.meta.stream_id.clone(),
            intent_id: self.meta.intent_id.clone(),
            segment_id: format!("{}:{:06}", self.meta.stream_id, self.next_seq),
            text: chunk.text,
            special: chunk.special,
            reason: chunk.reason,
            created_at: unix_millis(),
        };
        self.next_seq += 1;
        self.out
            .send(Ok(segment))
            .await
            .map_err(|_| StreamError::Handler("output receiver dropped".to_string()))
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
