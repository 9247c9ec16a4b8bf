//! Error types for Friday server operations.

use friday_protocol::ProtocolError;
use thiserror::Error;

use crate::provider::ProviderError;

/// Errors that can occur in Friday server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Protocol-level error (frame encoding, serialization)
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Upstream provider error
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Channel or stream error
    #[error("Channel error: {0}")]
    Channel(String),

    /// Socket bind or serve error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using ServerError
pub type Result<T> = std::result::Result<T, ServerError>;
