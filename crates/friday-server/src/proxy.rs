//! Stream proxy: upstream chunks in, protocol frames out.
//!
//! The proxy owns one sequential read loop over the provider's chunk stream
//! and one channel-backed write path to the outbound SSE response. The two
//! are pipelined but never parallelized, so event order on the wire is
//! exactly the order the upstream emitted its chunks.
//!
//! Termination contract: upstream exhaustion emits exactly one `done` event;
//! any mid-stream failure emits exactly one `error` event and closes the
//! outbound stream without a `done`, so clients can tell the two apart.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::response::sse::{Event as AxumSseEvent, KeepAlive, Sse};
use axum::response::IntoResponse;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

use friday_protocol::{extract_search_results, StreamEvent};

use crate::provider::{ChunkStream, GenerationChunk, Part};

/// Fallback message when an upstream failure carries no useful text.
const GENERIC_STREAM_ERROR: &str = "Unknown streaming error";

/// Error type for event send operations.
#[derive(Debug, Clone)]
pub struct SendError(pub StreamEvent);

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "channel closed")
    }
}

impl std::error::Error for SendError {}

/// Sender side of an outbound event channel.
///
/// The proxy worker pushes canonical events here; each one is serialized and
/// written to the client as an SSE frame by the paired [`EventStreamHandler`].
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<StreamEvent>,
}

impl EventSender {
    /// Sends an event to the outbound stream.
    ///
    /// Returns an error if the client has disconnected.
    pub async fn send(&self, event: StreamEvent) -> Result<(), SendError> {
        self.sender.send(event).await.map_err(|e| SendError(e.0))
    }

    /// Checks if the client is still connected.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Handler side of an outbound event channel.
///
/// Converted into the axum SSE response for the HTTP endpoint. The stream
/// ends when the sender is dropped.
pub struct EventStreamHandler {
    receiver: mpsc::Receiver<StreamEvent>,
}

impl EventStreamHandler {
    /// Converts this handler into an axum SSE response.
    pub fn into_response(self) -> impl IntoResponse {
        let stream = EventFrameStream {
            inner: ReceiverStream::new(self.receiver),
        };
        Sse::new(stream).keep_alive(KeepAlive::default())
    }
}

/// Internal stream wrapper that turns events into SSE frames.
struct EventFrameStream {
    inner: ReceiverStream<StreamEvent>,
}

impl Stream for EventFrameStream {
    type Item = Result<AxumSseEvent, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(event)) => {
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(err) => {
                        error!(error = %err, "event serialization failed");
                        format!(
                            r#"{{"type":"error","data":{{"message":"Serialization error: {err}"}}}}"#
                        )
                    }
                };
                let frame = AxumSseEvent::default().event("message").data(json);
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Creates a new outbound event channel pair.
///
/// `buffer` bounds how many events may be queued before sends wait for the
/// client to catch up.
pub fn channel(buffer: usize) -> (EventSender, EventStreamHandler) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender { sender: tx }, EventStreamHandler { receiver: rx })
}

/// Maps one native chunk to zero or more canonical events, in order.
///
/// Tool-call metadata comes first, then each content part of the first
/// candidate: text parts become `text` events, function responses either
/// expand into `search_result` events or pass through as `tool_response`.
pub fn chunk_to_events(chunk: &GenerationChunk) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    if let Some(calls) = &chunk.function_calls {
        events.push(StreamEvent::ToolCall(calls.clone()));
    }

    let parts = chunk
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| content.parts.as_slice())
        .unwrap_or_default();

    for part in parts {
        match part {
            Part::Text { text } => events.push(StreamEvent::Text(text.clone())),
            Part::FunctionResponse { function_response } => {
                match extract_search_results(&function_response.name, &function_response.response)
                {
                    Some(results) => {
                        events.extend(results.into_iter().map(StreamEvent::SearchResult));
                    }
                    None => events.push(StreamEvent::ToolResponse(serde_json::json!({
                        "name": function_response.name,
                        "response": function_response.response,
                    }))),
                }
            }
            Part::Other(_) => {}
        }
    }

    events
}

/// Drives one upstream chunk stream to completion, forwarding events.
///
/// Runs until the upstream is exhausted (emits `done`), the upstream fails
/// (emits `error` and stops without `done`), or the client disconnects.
pub async fn pump_events(mut chunks: ChunkStream, sender: EventSender) {
    while let Some(item) = chunks.next().await {
        match item {
            Ok(chunk) => {
                for event in chunk_to_events(&chunk) {
                    if sender.send(event).await.is_err() {
                        debug!("client disconnected, stopping upstream read loop");
                        return;
                    }
                }
            }
            Err(err) => {
                let mut message = err.to_string();
                if message.is_empty() {
                    message = GENERIC_STREAM_ERROR.to_string();
                }
                error!(error = %message, "upstream stream failed");
                let _ = sender.send(StreamEvent::error(message)).await;
                return;
            }
        }
    }
    let _ = sender.send(StreamEvent::Done {}).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Candidate, Content, FunctionResponse, ProviderError};
    use friday_protocol::{EventKind, SEARCH_TOOL_NAME};
    use serde_json::json;

    fn text_chunk(text: &str) -> GenerationChunk {
        GenerationChunk {
            function_calls: None,
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".into()),
                    parts: vec![Part::Text { text: text.into() }],
                }),
            }],
        }
    }

    fn search_chunk(results: serde_json::Value) -> GenerationChunk {
        GenerationChunk {
            function_calls: None,
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".into()),
                    parts: vec![Part::FunctionResponse {
                        function_response: FunctionResponse {
                            name: SEARCH_TOOL_NAME.into(),
                            response: json!({"searchResults": results}),
                        },
                    }],
                }),
            }],
        }
    }

    #[test]
    fn test_text_parts_map_to_text_events() {
        let events = chunk_to_events(&text_chunk("Hi"));
        assert_eq!(events, vec![StreamEvent::Text("Hi".into())]);
    }

    #[test]
    fn test_function_calls_map_to_tool_call_first() {
        let mut chunk = text_chunk("after");
        chunk.function_calls = Some(json!([{"name": SEARCH_TOOL_NAME}]));
        let events = chunk_to_events(&chunk);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), EventKind::ToolCall);
        assert_eq!(events[1].kind(), EventKind::Text);
    }

    #[test]
    fn test_search_response_expands_into_results() {
        let chunk = search_chunk(json!([
            {"url": "https://a.test", "title": "A"},
            {"url": "https://b.test"},
        ]));
        let events = chunk_to_events(&chunk);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind() == EventKind::SearchResult));
    }

    #[test]
    fn test_mismatched_search_shape_stays_tool_response() {
        let chunk = search_chunk(json!("not an array"));
        let events = chunk_to_events(&chunk);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::ToolResponse);
    }

    #[test]
    fn test_unknown_parts_are_skipped() {
        let chunk = GenerationChunk {
            function_calls: None,
            candidates: vec![Candidate {
                content: Some(Content {
                    role: None,
                    parts: vec![Part::Other(json!({"thought": true}))],
                }),
            }],
        };
        assert!(chunk_to_events(&chunk).is_empty());
    }

    #[tokio::test]
    async fn test_pump_emits_done_on_exhaustion() {
        let chunks: ChunkStream =
            Box::pin(futures::stream::iter(vec![Ok(text_chunk("Hi")), Ok(text_chunk(" there"))]));
        let (sender, handler) = channel(8);

        pump_events(chunks, sender).await;

        let mut receiver = handler.receiver;
        let mut received = Vec::new();
        while let Some(event) = receiver.recv().await {
            received.push(event);
        }
        assert_eq!(
            received,
            vec![
                StreamEvent::Text("Hi".into()),
                StreamEvent::Text(" there".into()),
                StreamEvent::Done {},
            ]
        );
    }

    #[tokio::test]
    async fn test_pump_emits_error_without_done_on_failure() {
        let chunks: ChunkStream = Box::pin(futures::stream::iter(vec![
            Ok(text_chunk("partial")),
            Err(ProviderError::Decode("bad chunk".into())),
        ]));
        let (sender, handler) = channel(8);

        pump_events(chunks, sender).await;

        let mut receiver = handler.receiver;
        let mut received = Vec::new();
        while let Some(event) = receiver.recv().await {
            received.push(event);
        }
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].kind(), EventKind::Text);
        match &received[1] {
            StreamEvent::Error(data) => assert!(data.message.contains("bad chunk")),
            other => panic!("expected error event, got {:?}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_sender_detects_disconnected_client() {
        let (sender, handler) = channel(2);
        drop(handler);
        assert!(sender.is_closed());
        assert!(sender.send(StreamEvent::Done {}).await.is_err());
    }
}
