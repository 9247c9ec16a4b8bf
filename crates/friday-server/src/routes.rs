//! HTTP routes for the Friday server.
//!
//! - `POST /api/ai` — streaming generation proxy
//! - `GET /health` — health check
//!
//! Request validation failures and provider failures that occur before any
//! bytes are streamed surface as structured JSON errors (400/500). Failures
//! after streaming has begun surface in-band as `error` events; the status
//! code cannot change once headers are sent.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::config::ServerConfig;
use crate::provider::{Content, GenerationConfig, GenerationRequest, ModelProvider};
use crate::proxy::{self, pump_events};

use friday_protocol::SEARCH_TOOL_NAME;

/// Outbound channel capacity per turn.
const EVENT_BUFFER: usize = 32;

/// Shared state for the Friday server.
#[derive(Clone)]
pub struct AppState {
    /// Upstream provider the proxy forwards to.
    pub provider: Arc<dyn ModelProvider>,
    /// Server configuration.
    pub config: ServerConfig,
}

impl AppState {
    /// Creates server state from a provider and configuration.
    pub fn new(provider: Arc<dyn ModelProvider>, config: ServerConfig) -> Self {
        Self { provider, config }
    }
}

/// Body of a generation request.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    /// The user prompt; required and non-empty.
    #[serde(default)]
    pub prompt: String,
    /// Optional model override.
    #[serde(default)]
    pub model: Option<String>,
    /// Whether to attach the search tool.
    #[serde(rename = "useSearch", default)]
    pub use_search: bool,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ai", post(generate))
        .route("/health", get(health))
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "friday-server",
        "protocol": "friday-stream"
    }))
}

/// Streaming generation endpoint.
pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "rejected malformed request body");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    if body.prompt.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Prompt is required");
    }

    let request = build_generation_request(&state.config, &body);

    match state.provider.stream_generate(request).await {
        Ok(chunks) => {
            let (sender, handler) = proxy::channel(EVENT_BUFFER);
            tokio::spawn(pump_events(chunks, sender));
            handler.into_response().into_response()
        }
        Err(err) => {
            error!(error = %err, "provider call failed before streaming");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// Assembles the upstream request from the body and server defaults.
fn build_generation_request(config: &ServerConfig, body: &GenerateBody) -> GenerationRequest {
    let tools = if body.use_search {
        vec![json!({ (SEARCH_TOOL_NAME): {} })]
    } else {
        Vec::new()
    };

    GenerationRequest {
        model: body
            .model
            .clone()
            .unwrap_or_else(|| config.default_model.clone()),
        config: GenerationConfig {
            tools,
            system_instruction: Some(Content::text("system", &config.system_instruction)),
        },
        contents: vec![Content::text("user", &body.prompt)],
    }
}

/// Builds a structured JSON error response.
fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}
