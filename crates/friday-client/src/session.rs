//! Chat session controller.
//!
//! Drives one user turn end to end: issue the request, read the response
//! body chunk by chunk, decode frames, classify events, and fold them into
//! the turn's [`RenderState`], invoking a re-render callback after each
//! applied event.
//!
//! One sequential read loop exists per turn, so no concurrent mutation of
//! the state is possible. Cancellation is caller-driven: dropping the
//! in-flight future aborts the body read and releases the connection, and
//! no state updates can occur afterwards. The controller never retries; a
//! retry is a fresh turn.

use std::time::Instant;

use futures::StreamExt;
use serde::Serialize;
use tracing::{debug, warn};

use friday_protocol::{classify, FrameDecoder, StreamEvent};

use crate::error::{ClientError, Result};
use crate::state::{RenderState, TurnStatus};

/// One generation request, as sent to the server.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRequest {
    /// The user prompt.
    pub prompt: String,
    /// Optional model override; the server defaults it when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Whether the server should attach its search tool.
    #[serde(rename = "useSearch")]
    pub use_search: bool,
}

impl TurnRequest {
    /// Creates a request with just a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            use_search: false,
        }
    }

    /// Sets the model override.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Enables the search tool for this turn.
    pub fn with_search(mut self) -> Self {
        self.use_search = true;
        self
    }
}

/// Client for the Friday streaming endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    /// Creates a client for the given `/api/ai` endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Creates a client reusing an existing HTTP client.
    pub fn with_http(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Runs one turn to completion, returning the final render state.
    ///
    /// `on_update` is invoked after every state change so a UI can re-render
    /// incrementally. Transport failures, pre-stream HTTP errors, and streams
    /// that close without a terminal event all fold into the returned state
    /// as `status == Error`; the elapsed duration is recorded in every case.
    pub async fn send_turn(
        &self,
        request: &TurnRequest,
        mut on_update: impl FnMut(&RenderState),
    ) -> RenderState {
        let started = Instant::now();
        let mut state = RenderState::new();
        on_update(&state);

        if let Err(err) = self.stream_turn(request, &mut state, &mut on_update).await {
            debug!(error = %err, "turn failed");
            if !state.is_terminal() {
                state.apply(StreamEvent::error(err.to_string()));
            }
        }

        state.duration = Some(started.elapsed());
        on_update(&state);
        state
    }

    /// The read loop of one turn; errors fold into state in [`send_turn`].
    async fn stream_turn(
        &self,
        request: &TurnRequest,
        state: &mut RenderState,
        on_update: &mut impl FnMut(&RenderState),
    ) -> Result<()> {
        let response = self.http.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("error")?.as_str().map(str::to_string))
                .unwrap_or_else(|| format!("HTTP error! status: {status}"));
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let mut decoder = FrameDecoder::new();
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            if state.status == TurnStatus::Pending {
                state.status = TurnStatus::Streaming;
                on_update(state);
            }
            for frame in decoder.feed(&chunk) {
                for event in classify(&frame) {
                    state.apply(event);
                    on_update(state);
                }
            }
        }

        if let Some(residual) = decoder.finish() {
            warn!(residual = %residual, "stream ended with unprocessed buffer");
        }

        if !state.is_terminal() {
            return Err(ClientError::UnexpectedEof);
        }
        Ok(())
    }
}
