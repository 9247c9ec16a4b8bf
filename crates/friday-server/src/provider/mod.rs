//! Upstream model provider abstraction.
//!
//! A provider accepts a [`GenerationRequest`] and returns an asynchronous
//! sequence of [`GenerationChunk`]s mirroring the upstream wire shape: each
//! chunk optionally carries tool-call metadata plus `candidates[0].content.parts[]`,
//! where a part is either `{text}` or `{functionResponse}`.
//!
//! The proxy consumes this stream sequentially and maps each native chunk to
//! zero or more canonical protocol events; see [`crate::proxy`].

pub mod gemini;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

pub use gemini::GeminiProvider;

/// Errors raised by upstream model providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure talking to the provider
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider replied with a non-success status before streaming
    #[error("Upstream returned {status}: {message}")]
    Upstream {
        /// HTTP status from the provider.
        status: u16,
        /// Error message extracted from the provider response body.
        message: String,
    },

    /// Provider emitted a chunk the decoder could not parse
    #[error("Malformed upstream chunk: {0}")]
    Decode(String),

    /// Missing or invalid provider credentials
    #[error("Credentials error: {0}")]
    Credentials(String),
}

/// A streamed sequence of native provider chunks.
pub type ChunkStream = BoxStream<'static, std::result::Result<GenerationChunk, ProviderError>>;

/// One generation request against an upstream provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier to generate with.
    pub model: String,
    /// Tools and system instruction attached to the request.
    pub config: GenerationConfig,
    /// Conversation contents, in order.
    pub contents: Vec<Content>,
}

/// Request configuration: tools and system instruction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Tool declarations, e.g. `{"googleSearch": {}}`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<JsonValue>,
    /// Fixed system instruction describing persona and citation expectations.
    #[serde(
        rename = "systemInstruction",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub system_instruction: Option<Content>,
}

/// One content block: a role plus ordered parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Originating role ("user", "model", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Ordered parts of this content block.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Creates a content block holding a single text part.
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

/// One part of a content block.
///
/// The upstream emits parts as single-key objects; unknown part shapes are
/// preserved in [`Part::Other`] and skipped by the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// A text fragment.
    Text {
        /// The text payload.
        text: String,
    },
    /// The result of a tool invocation.
    FunctionResponse {
        /// The function response payload.
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    /// Any other part shape the proxy does not interpret.
    Other(JsonValue),
}

/// A tool result attached to a content part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Name of the tool that produced this response.
    pub name: String,
    /// Tool-specific response payload.
    #[serde(default)]
    pub response: JsonValue,
}

/// One native chunk from the upstream stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationChunk {
    /// Tool/function-call metadata, when the model requests a tool.
    #[serde(
        rename = "functionCalls",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub function_calls: Option<JsonValue>,
    /// Response candidates; only the first is consumed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
}

/// One response candidate inside a chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    /// Content carried by this candidate, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

/// An upstream model provider producing a chunk stream per request.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Opens a streaming generation call.
    ///
    /// Failures returned here occur before any outbound bytes are streamed
    /// and surface to the client as an HTTP error; failures yielded inside
    /// the stream surface in-band as `error` events.
    async fn stream_generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<ChunkStream, ProviderError>;
}
