//! Friday Protocol Core
//!
//! This crate provides the wire-level building blocks shared by the Friday
//! streaming server and client:
//!
//! - **Event types**: The canonical [`StreamEvent`] sum type carried on the wire
//! - **Frame codec**: SSE-shaped frame encoding and the incremental [`FrameDecoder`]
//! - **Classification**: Turning raw frames into typed events, including
//!   search-result canonicalization of tool responses
//!
//! # Wire format
//!
//! Each frame is a Server-Sent-Events-shaped block terminated by a blank line:
//!
//! ```text
//! event: message
//! data: {"type": "text", "data": "Hello"}
//!
//! ```
//!
//! Frames may arrive split at arbitrary byte offsets (including inside a
//! multi-byte UTF-8 character); [`FrameDecoder`] buffers partial input until a
//! complete frame boundary is observed.

pub mod classify;
pub mod error;
pub mod event;
pub mod frame;

// Re-export key types for convenience
pub use error::{ProtocolError, Result};

/// Re-export serde_json::Value for consistent JSON handling across the crate
pub use serde_json::Value as JsonValue;

pub use classify::{classify, extract_search_results, SEARCH_TOOL_NAME};
pub use event::{ErrorData, EventKind, SearchResult, StreamEvent};
pub use frame::{data_line, encode_frame, FrameDecoder, DATA_PREFIX, EVENT_MARKER, FRAME_DELIMITER};
