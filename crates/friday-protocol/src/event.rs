//! Friday Event Types
//!
//! This module defines the canonical event types carried by the Friday
//! streaming protocol:
//!
//! - Text deltas
//! - Tool calls and tool responses (opaque passthrough)
//! - Search results (canonicalized tool responses)
//! - Error and completion sentinels
//!
//! Every stream logically terminates with exactly one `done` or one `error`
//! event; consumers must treat anything after a terminal event as invalid.

use crate::JsonValue;
use serde::{Deserialize, Serialize};

/// Event kinds for the Friday streaming protocol.
///
/// Kinds are serialized in snake_case (e.g. `search_result`), matching the
/// `type` discriminant on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A UTF-8 text fragment (a delta, not necessarily a full token).
    Text,
    /// A requested tool invocation, passed through for observability.
    ToolCall,
    /// A tool's result that did not canonicalize into search results.
    ToolResponse,
    /// One discovered source from a search tool response.
    SearchResult,
    /// Stream failed; terminal.
    Error,
    /// Stream completed gracefully; terminal.
    Done,
}

impl EventKind {
    /// Returns the string representation of the event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Text => "text",
            EventKind::ToolCall => "tool_call",
            EventKind::ToolResponse => "tool_response",
            EventKind::SearchResult => "search_result",
            EventKind::Error => "error",
            EventKind::Done => "done",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One discovered source from a search tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Source URL.
    pub url: String,
    /// Optional page title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional text snippet from the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl SearchResult {
    /// Creates a new search result with only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            snippet: None,
        }
    }

    /// Sets the title for this result.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the snippet for this result.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// Payload of an `error` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    /// Human-readable description of what went wrong.
    pub message: String,
}

impl ErrorData {
    /// Creates a new error payload.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Union of all events in the Friday streaming protocol.
///
/// Events are serialized adjacently tagged, matching the wire shape
/// `{"type": "<kind>", "data": <payload>}`:
///
/// ```json
/// {"type": "text", "data": "Hello"}
/// {"type": "search_result", "data": {"url": "https://x.test", "title": "X"}}
/// {"type": "done", "data": {}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A text fragment from the model.
    Text(String),
    /// Opaque structured data describing a requested tool invocation.
    ToolCall(JsonValue),
    /// Opaque structured data describing a tool's result.
    ToolResponse(JsonValue),
    /// One discovered source, expanded from a search tool response.
    SearchResult(SearchResult),
    /// Stream failed.
    Error(ErrorData),
    /// Stream completed gracefully.
    Done {},
}

impl StreamEvent {
    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            StreamEvent::Text(_) => EventKind::Text,
            StreamEvent::ToolCall(_) => EventKind::ToolCall,
            StreamEvent::ToolResponse(_) => EventKind::ToolResponse,
            StreamEvent::SearchResult(_) => EventKind::SearchResult,
            StreamEvent::Error(_) => EventKind::Error,
            StreamEvent::Done {} => EventKind::Done,
        }
    }

    /// Returns true if this event terminates a stream (`done` or `error`).
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done {} | StreamEvent::Error(_))
    }

    /// Convenience accessor for text delta contents.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamEvent::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Creates an `error` event from a message.
    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error(ErrorData::new(message))
    }
}
