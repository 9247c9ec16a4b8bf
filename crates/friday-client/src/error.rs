//! Error types for Friday client operations.

use thiserror::Error;

/// Errors that can occur while driving one turn.
///
/// All of these fold into the turn's [`crate::RenderState`] as an `error`
/// terminal status; they are not surfaced past the session controller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or body-read failure
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server rejected the request before streaming began
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or a generic fallback.
        message: String,
    },

    /// Stream closed without a terminal `done` or `error` event
    #[error("stream closed before completion")]
    UnexpectedEof,
}

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;
