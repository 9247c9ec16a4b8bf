//! Friday Server
//!
//! Server-side streaming proxy for the Friday protocol. It accepts one
//! generation request per turn, opens a streaming call against an upstream
//! model provider, maps each native chunk to canonical protocol events, and
//! re-emits them to the client as SSE frames.
//!
//! # Architecture
//!
//! ```text
//! Client
//!     ↓ POST /api/ai
//! Routes (validation, 400/500 before streaming)
//!     ↓ GenerationRequest
//! ModelProvider (Gemini over reqwest SSE)
//!     ↓ GenerationChunk stream
//! Proxy (chunk → events, done/error termination)
//!     ↓ event channel
//! SSE response (event: message / data: {...})
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use friday_server::{serve, AppState, GeminiProvider, ServerConfig};
//!
//! let provider = Arc::new(GeminiProvider::from_env()?);
//! serve(ServerConfig::default(), provider).await?;
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod proxy;
pub mod routes;

use std::sync::Arc;

use tracing::info;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use provider::{
    Candidate, ChunkStream, Content, FunctionResponse, GeminiProvider, GenerationChunk,
    GenerationConfig, GenerationRequest, ModelProvider, Part, ProviderError,
};
pub use proxy::{channel, chunk_to_events, pump_events, EventSender, EventStreamHandler};
pub use routes::{router, AppState, GenerateBody};

/// Binds the configured address and serves the Friday router until shutdown.
pub async fn serve(config: ServerConfig, provider: Arc<dyn ModelProvider>) -> Result<()> {
    let addr = config.bind_addr();
    let app = router(AppState::new(provider, config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "friday-server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
