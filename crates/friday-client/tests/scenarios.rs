//! End-to-end turns against a stubbed upstream provider.
//!
//! Each test serves the real Friday router on an ephemeral port, scripts the
//! provider's chunk stream, and drives a full client turn through the
//! decode → classify → reduce pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use friday_client::{ChatClient, EventKind, StreamEvent, TurnRequest, TurnStatus};
use friday_server::{
    AppState, Candidate, ChunkStream, Content, FunctionResponse, GenerationChunk,
    GenerationRequest, ModelProvider, Part, ProviderError, ServerConfig,
};

type Script = fn() -> Vec<Result<GenerationChunk, ProviderError>>;

/// Provider whose stream replays a scripted chunk sequence.
struct StubProvider {
    script: Script,
}

#[async_trait]
impl ModelProvider for StubProvider {
    async fn stream_generate(
        &self,
        _request: GenerationRequest,
    ) -> Result<ChunkStream, ProviderError> {
        Ok(Box::pin(futures::stream::iter((self.script)())))
    }
}

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

fn search_chunk() -> GenerationChunk {
    GenerationChunk {
        function_calls: None,
        candidates: vec![Candidate {
            content: Some(Content {
                role: Some("model".into()),
                parts: vec![Part::FunctionResponse {
                    function_response: FunctionResponse {
                        name: "googleSearch".into(),
                        response: json!({
                            "searchResults": [{"url": "https://x.test", "title": "X"}]
                        }),
                    },
                }],
            }),
        }],
    }
}

/// Serves the router with a scripted provider; returns the endpoint URL.
async fn spawn_server(script: Script) -> String {
    let state = AppState::new(
        Arc::new(StubProvider { script }),
        ServerConfig::default(),
    );
    let app = friday_server::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/ai")
}

#[tokio::test]
async fn two_text_chunks_stream_to_done() {
    let endpoint = spawn_server(|| vec![Ok(text_chunk("Hi")), Ok(text_chunk(" there"))]).await;
    let client = ChatClient::new(endpoint);

    let state = client.send_turn(&TurnRequest::new("Hello"), |_| {}).await;

    assert_eq!(
        state.parts,
        vec![
            StreamEvent::Text("Hi".into()),
            StreamEvent::Text(" there".into()),
        ]
    );
    assert_eq!(state.status, TurnStatus::Done);
    assert!(!state.thinking);
    assert_eq!(state.text(), "Hi there");
    assert!(state.error.is_none());
    assert!(state.duration.is_some());
}

#[tokio::test]
async fn search_response_becomes_one_result_and_source() {
    let endpoint = spawn_server(|| vec![Ok(search_chunk())]).await;
    let client = ChatClient::new(endpoint);

    let state = client
        .send_turn(&TurnRequest::new("find x").with_search(), |_| {})
        .await;

    assert_eq!(state.status, TurnStatus::Done);
    assert_eq!(state.parts.len(), 1);
    assert_eq!(state.parts[0].kind(), EventKind::SearchResult);
    assert!(!state
        .parts
        .iter()
        .any(|part| part.kind() == EventKind::ToolResponse));
    assert_eq!(state.sources.len(), 1);
    assert_eq!(state.sources[0].url, "https://x.test");
    assert_eq!(state.sources[0].title, "X");
}

#[tokio::test]
async fn upstream_failure_after_text_ends_in_error() {
    let endpoint = spawn_server(|| {
        vec![
            Ok(text_chunk("partial")),
            Err(ProviderError::Upstream {
                status: 502,
                message: "provider exploded".into(),
            }),
        ]
    })
    .await;
    let client = ChatClient::new(endpoint);

    let state = client.send_turn(&TurnRequest::new("Hello"), |_| {}).await;

    assert_eq!(state.status, TurnStatus::Error);
    assert_eq!(state.parts.len(), 2);
    assert_eq!(state.parts[0], StreamEvent::Text("partial".into()));
    assert_eq!(state.parts[1].kind(), EventKind::Error);
    let message = state.error.expect("error message set");
    assert!(message.contains("provider exploded"));
    assert!(state.duration.expect("duration recorded") > Duration::ZERO);
}

#[tokio::test]
async fn empty_prompt_is_rejected_before_streaming() {
    let endpoint = spawn_server(|| vec![Ok(text_chunk("never sent"))]).await;

    // Raw HTTP contract: 400 with a structured error body, no stream.
    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(&json!({"prompt": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Prompt is required"}));

    // The session controller folds the same rejection into the turn state.
    let client = ChatClient::new(endpoint);
    let state = client.send_turn(&TurnRequest::new(""), |_| {}).await;
    assert_eq!(state.status, TurnStatus::Error);
    assert_eq!(state.error.as_deref(), Some("Prompt is required"));
    assert!(state.parts.iter().all(|p| p.kind() == EventKind::Error));
    assert!(state.duration.is_some());
}

#[tokio::test]
async fn malformed_body_is_rejected_with_structured_error() {
    let endpoint = spawn_server(Vec::new).await;

    let response = reqwest::Client::new()
        .post(&endpoint)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn updates_fire_for_every_applied_event() {
    let endpoint = spawn_server(|| vec![Ok(text_chunk("a")), Ok(text_chunk("b"))]).await;
    let client = ChatClient::new(endpoint);

    let mut statuses = Vec::new();
    let state = client
        .send_turn(&TurnRequest::new("Hello"), |state| {
            statuses.push((state.status, state.parts.len()));
        })
        .await;

    assert_eq!(state.status, TurnStatus::Done);
    // pending, streaming, one per text event, done, final duration update
    assert!(statuses.len() >= 5);
    assert_eq!(statuses.first().unwrap(), &(TurnStatus::Pending, 0));
    assert_eq!(statuses.last().unwrap(), &(TurnStatus::Done, 2));
    // parts only ever grow
    assert!(statuses.windows(2).all(|w| w[0].1 <= w[1].1));
}
