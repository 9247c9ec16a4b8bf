//! Error types for Friday protocol operations.

use thiserror::Error;

/// Errors that can occur in Friday protocol operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Error during JSON serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid frame format or structure
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}

/// Result type alias using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
