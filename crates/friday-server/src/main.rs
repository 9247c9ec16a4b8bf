//! Friday server binary.
//!
//! Configuration comes from the environment:
//! - `GEMINI_API_KEY` (required) and `GEMINI_BASE_URL` (optional)
//! - `FRIDAY_HOST` / `FRIDAY_PORT` to override the bind address
//! - `FRIDAY_MODEL` to override the default model
//! - `RUST_LOG` for log filtering

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use friday_server::{serve, GeminiProvider, Result, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut config = ServerConfig::default();
    if let Ok(host) = std::env::var("FRIDAY_HOST") {
        config = config.host(host);
    }
    if let Ok(port) = std::env::var("FRIDAY_PORT") {
        match port.parse::<u16>() {
            Ok(port) => config = config.port(port),
            Err(_) => tracing::warn!(%port, "ignoring unparsable FRIDAY_PORT"),
        }
    }
    if let Ok(model) = std::env::var("FRIDAY_MODEL") {
        config = config.default_model(model);
    }

    let provider = Arc::new(GeminiProvider::from_env()?);
    serve(config, provider).await
}
