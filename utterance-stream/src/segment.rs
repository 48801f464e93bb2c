//! Token and segment types at the pipeline boundary

use serde::{Deserialize, Serialize};
use utterance_core::EmitReason;

/// A typed item in the upstream token stream
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TextToken {
    /// Literal text to be spoken
    Literal(String),
    /// Non-text marker whose payload is reattached to the following segment
    Special(String),
    /// Explicit flush point
    Flush,
}

/// Identity of the stream a segment belongs to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMeta {
    /// Stream identifier
    pub stream_id: String,
    /// Intent the stream was produced for
    pub intent_id: String,
}

/// A finalized, addressable unit of speech-ready text
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSegment {
    /// Stream identifier, copied from [`StreamMeta`]
    pub stream_id: String,
    /// Intent identifier, copied from [`StreamMeta`]
    pub intent_id: String,
    /// Unique within the stream and sortable by arrival
    pub segment_id: String,
    /// Sanitized segment text
    pub text: String,
    /// Special payload accompanying, not replacing, adjacent speech text
    pub special: Option<String>,
    /// Emission trigger, opaque routing metadata for consumers
    pub reason: EmitReason,
    /// Milliseconds since the Unix epoch
    pub created_at: u64,
}
