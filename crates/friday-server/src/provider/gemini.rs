//! Gemini upstream provider.
//!
//! Talks to the Generative Language API's `streamGenerateContent` endpoint
//! with `alt=sse`, reusing the protocol [`FrameDecoder`] to reassemble the
//! upstream SSE frames before parsing each `data:` payload into a
//! [`GenerationChunk`].

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use friday_protocol::{data_line, FrameDecoder};

use super::{
    ChunkStream, Content, GenerationChunk, GenerationRequest, ModelProvider, ProviderError,
};
use async_trait::async_trait;

/// Default API endpoint for the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the base URL (useful for test doubles).
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";

/// Provider implementation for Gemini models.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// Request body for `streamGenerateContent`.
#[derive(Debug, Serialize)]
struct GeminiRequestBody<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [JsonValue],
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<&'a Content>,
}

/// Error envelope returned by the API on non-success statuses.
#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiProvider {
    /// Creates a provider with the given API key and the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds a provider from `GEMINI_API_KEY` (and optional `GEMINI_BASE_URL`).
    pub fn from_env() -> std::result::Result<Self, ProviderError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| ProviderError::Credentials(format!("{API_KEY_ENV} is not set")))?;
        let mut provider = Self::new(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            provider = provider.with_base_url(base_url);
        }
        Ok(provider)
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        )
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn stream_generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<ChunkStream, ProviderError> {
        let body = GeminiRequestBody {
            contents: &request.contents,
            tools: &request.config.tools,
            system_instruction: request.config.system_instruction.as_ref(),
        };

        let response = self
            .http
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| {
                    if text.is_empty() {
                        status.to_string()
                    } else {
                        text
                    }
                });
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        debug!(model = %request.model, "upstream stream opened");

        let chunks = response
            .bytes_stream()
            .scan(FrameDecoder::new(), |decoder, item| {
                let parsed: Vec<std::result::Result<GenerationChunk, ProviderError>> = match item {
                    Ok(bytes) => decoder
                        .feed(&bytes)
                        .iter()
                        .filter_map(|frame| parse_data_frame(frame))
                        .collect(),
                    Err(err) => vec![Err(ProviderError::Request(err))],
                };
                futures::future::ready(Some(futures::stream::iter(parsed)))
            })
            .flatten();

        Ok(Box::pin(chunks))
    }
}

/// Parses one upstream SSE frame into a chunk.
///
/// The upstream frames carry only a `data:` line (no event name); frames
/// without one, such as keep-alive comments, are skipped.
fn parse_data_frame(
    frame: &str,
) -> Option<std::result::Result<GenerationChunk, ProviderError>> {
    let payload = data_line(frame)?;

    match serde_json::from_str::<GenerationChunk>(payload) {
        Ok(chunk) => Some(Ok(chunk)),
        Err(err) => {
            warn!(error = %err, "failed to parse upstream chunk");
            Some(Err(ProviderError::Decode(err.to_string())))
        }
    }
}
