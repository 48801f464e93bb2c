//! Integration tests for the token-to-segment pipeline

use async_trait::async_trait;
use futures::stream;
use serde_json::json;
use utterance_stream::{
    drive_chunks, segment_stream, ChunkHandler, EmitReason, OutputSegment, ResolvedChunk, Result,
    StreamError, StreamMeta, StreamOptions, TextToken,
};

fn meta() -> StreamMeta {
    StreamMeta {
        stream_id: "s1".to_string(),
        intent_id: "i1".to_string(),
    }
}

fn literal(text: &str) -> Result<TextToken> {
    Ok(TextToken::Literal(text.to_string()))
}

async fn collect(
    mut rx: tokio::sync::mpsc::Receiver<Result<OutputSegment>>,
) -> Vec<Result<OutputSegment>> {
    let mut items = Vec::new();
    while let Some(item) = rx.recv().await {
        items.push(item);
    }
    items
}

#[tokio::test]
async fn special_round_trip_through_pipeline() {
    let tokens = stream::iter(vec![
        literal("hi "),
        Ok(TextToken::Special("p1".to_string())),
        literal("there."),
    ]);
    let rx = segment_stream(tokens, meta(), StreamOptions::default());
    let segments: Vec<OutputSegment> = collect(rx).await.into_iter().map(|s| s.unwrap()).collect();

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].text, "hi");
    assert_eq!(segments[0].special.as_deref(), Some("p1"));
    assert_eq!(segments[0].reason, EmitReason::Special);
    assert_eq!(segments[1].text, "there.");
    assert_eq!(segments[1].special, None);
    assert_eq!(segments[1].reason, EmitReason::Hard);
}

#[tokio::test]
async fn segment_ids_are_unique_and_ordered() {
    let tokens = stream::iter(vec![literal("One. Two. Three.")]);
    let rx = segment_stream(tokens, meta(), StreamOptions::default());
    let segments: Vec<OutputSegment> = collect(rx).await.into_iter().map(|s| s.unwrap()).collect();

    let ids: Vec<&str> = segments.iter().map(|s| s.segment_id.as_str()).collect();
    assert_eq!(ids, ["s1:000000", "s1:000001", "s1:000002"]);
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(sorted, ids);
    assert!(segments.iter().all(|s| s.created_at > 0));
    assert!(segments.iter().all(|s| s.stream_id == "s1" && s.intent_id == "i1"));
}

#[tokio::test]
async fn flush_token_forces_emission() {
    let tokens = stream::iter(vec![literal("pending words"), Ok(TextToken::Flush)]);
    let rx = segment_stream(tokens, meta(), StreamOptions::default());
    let segments: Vec<OutputSegment> = collect(rx).await.into_iter().map(|s| s.unwrap()).collect();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "pending words");
    assert_eq!(segments[0].reason, EmitReason::Flush);
}

#[tokio::test]
async fn end_of_stream_flushes_remainder() {
    let tokens = stream::iter(vec![literal("left over text")]);
    let rx = segment_stream(tokens, meta(), StreamOptions::default());
    let segments: Vec<OutputSegment> = collect(rx).await.into_iter().map(|s| s.unwrap()).collect();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "left over text");
    assert_eq!(segments[0].reason, EmitReason::Flush);
}

#[tokio::test]
async fn empty_stream_yields_no_segments() {
    let tokens = stream::iter(Vec::<Result<TextToken>>::new());
    let rx = segment_stream(tokens, meta(), StreamOptions::default());
    assert!(collect(rx).await.is_empty());
}

#[tokio::test]
async fn upstream_error_is_terminal() {
    let tokens = stream::iter(vec![
        literal("abc"),
        Err(StreamError::Upstream("boom".to_string())),
    ]);
    let rx = segment_stream(tokens, meta(), StreamOptions::default());
    let items = collect(rx).await;

    // The buffered "abc" is not salvaged; the only item is the failure.
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(StreamError::Upstream(_))));
}

#[tokio::test]
async fn tiny_channel_capacity_still_delivers_in_order() {
    let tokens = stream::iter(vec![
        literal("First sentence. "),
        literal("Second sentence. "),
        literal("Third sentence."),
    ]);
    let options = StreamOptions {
        channel_capacity: 1,
        ..StreamOptions::default()
    };
    let rx = segment_stream(tokens, meta(), options);
    let segments: Vec<OutputSegment> = collect(rx).await.into_iter().map(|s| s.unwrap()).collect();

    let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        ["First sentence.", "Second sentence.", "Third sentence."]
    );
}

/// Records handled chunks and fails once the configured limit is reached
struct RecordingHandler {
    seen: Vec<ResolvedChunk>,
    fail_at: Option<usize>,
}

#[async_trait]
impl ChunkHandler for RecordingHandler {
    async fn handle(&mut self, chunk: ResolvedChunk) -> Result<()> {
        if Some(self.seen.len()) == self.fail_at {
            return Err(StreamError::Handler("sink unavailable".to_string()));
        }
        self.seen.push(chunk);
        Ok(())
    }
}

#[tokio::test]
async fn handler_failure_stops_consumption_without_error() {
    let tokens = stream::iter(vec![literal("One. Two. Three.")]);
    let mut handler = RecordingHandler {
        seen: Vec::new(),
        fail_at: Some(1),
    };
    let outcome = drive_chunks(tokens, StreamOptions::default(), &mut handler).await;

    // Log-and-stop: the failure is swallowed and later chunks never arrive.
    assert!(outcome.is_ok());
    assert_eq!(handler.seen.len(), 1);
    assert_eq!(handler.seen[0].text, "One.");
}

#[tokio::test]
async fn healthy_handler_receives_every_chunk() {
    // Companion to the fail-fast test above: with no failure the same
    // input produces three chunks, which is what a per-chunk isolation
    // policy would preserve.
    let tokens = stream::iter(vec![literal("One. Two. Three.")]);
    let mut handler = RecordingHandler {
        seen: Vec::new(),
        fail_at: None,
    };
    drive_chunks(tokens, StreamOptions::default(), &mut handler)
        .await
        .unwrap();

    let texts: Vec<&str> = handler.seen.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["One.", "Two.", "Three."]);
}

#[tokio::test]
async fn fresh_pipelines_are_deterministic() {
    let run = || async {
        let tokens = stream::iter(vec![
            literal("Same input, same output. "),
            Ok(TextToken::Special("x".to_string())),
            literal("Every time!"),
        ]);
        let rx = segment_stream(tokens, meta(), StreamOptions::default());
        collect(rx)
            .await
            .into_iter()
            .map(|s| {
                let segment = s.unwrap();
                (segment.text, segment.special, segment.reason)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run().await, run().await);
}

#[test]
fn token_and_reason_wire_shapes() {
    let token = TextToken::Literal("x".to_string());
    assert_eq!(
        serde_json::to_value(&token).unwrap(),
        json!({"type": "literal", "value": "x"})
    );
    assert_eq!(
        serde_json::to_value(TextToken::Flush).unwrap(),
        json!({"type": "flush"})
    );
    assert_eq!(serde_json::to_value(EmitReason::Hard).unwrap(), json!("hard"));

    let round_trip: TextToken =
        serde_json::from_value(json!({"type": "special", "value": "p"})).unwrap();
    assert_eq!(round_trip, TextToken::Special("p".to_string()));

    let segment = OutputSegment {
        stream_id: "s".to_string(),
        intent_id: "i".to_string(),
        segment_id: "s:000000".to_string(),
        text: "hi".to_string(),
        special: None,
        reason: EmitReason::Boost,
        created_at: 1,
    };
    let value = serde_json::to_value(&segment).unwrap();
    assert_eq!(value["reason"], json!("boost"));
    assert_eq!(value["special"], json!(null));
}
