//! Frame classification.
//!
//! Turns one complete wire frame into typed events. Classification is total:
//! unrecognized frames are ignored (and logged), malformed payloads degrade
//! into a synthetic `error` event, and nothing in this module panics on
//! untrusted input.
//!
//! Tool responses from the search tool are canonicalized here: a response
//! carrying `searchResults: [{url, title?, snippet?}, ..]` expands into one
//! `search_result` event per item, so search content is never rendered twice.

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::event::{SearchResult, StreamEvent};
use crate::frame::{data_line, EVENT_MARKER};

/// Tool identifier of the upstream search tool.
pub const SEARCH_TOOL_NAME: &str = "googleSearch";

/// Message used for the synthetic error event on malformed payloads.
const PARSE_FAILURE_MESSAGE: &str = "Failed to parse stream data";

/// Classifies one complete frame into zero or more events.
///
/// - Frames not starting with the `event: message` marker are ignored.
/// - A frame with no `data:` line is ignored.
/// - A `data:` line that fails to parse yields exactly one synthetic `error`
///   event rather than propagating the parse failure.
/// - A `tool_response` matching the search tool's result shape expands into
///   one `search_result` event per item; on shape mismatch it stays a
///   generic `tool_response`.
///
/// Classification is deterministic: the same frame always yields
/// structurally equal events.
pub fn classify(frame: &str) -> Vec<StreamEvent> {
    if !frame.starts_with(EVENT_MARKER) {
        if !frame.trim().is_empty() {
            debug!(frame = %frame, "ignoring frame without event marker");
        }
        return Vec::new();
    }

    let Some(data) = data_line(frame) else {
        debug!("ignoring event frame without data line");
        return Vec::new();
    };

    match serde_json::from_str::<StreamEvent>(data) {
        Ok(event) => expand(event),
        Err(err) => {
            warn!(error = %err, "malformed frame payload");
            vec![StreamEvent::error(PARSE_FAILURE_MESSAGE)]
        }
    }
}

/// Applies search-result canonicalization to a parsed event.
fn expand(event: StreamEvent) -> Vec<StreamEvent> {
    match event {
        StreamEvent::ToolResponse(payload) => {
            let name = payload.get("name").and_then(JsonValue::as_str);
            let results = name
                .filter(|name| *name == SEARCH_TOOL_NAME)
                .and_then(|name| extract_search_results(name, payload.get("response")?));
            match results {
                Some(results) => results.into_iter().map(StreamEvent::SearchResult).collect(),
                None => vec![StreamEvent::ToolResponse(payload)],
            }
        }
        event => vec![event],
    }
}

/// Attempts to interpret a tool response as a list of search results.
///
/// Returns `Some` only when the tool name matches [`SEARCH_TOOL_NAME`] and
/// the response carries `searchResults` as an array where every item has a
/// string `url`. Any shape mismatch returns `None` so the caller can fall
/// back to a generic `tool_response`.
pub fn extract_search_results(name: &str, response: &JsonValue) -> Option<Vec<SearchResult>> {
    if name != SEARCH_TOOL_NAME {
        return None;
    }
    let items = response.get("searchResults")?.as_array()?;
    items
        .iter()
        .map(|item| serde_json::from_value::<SearchResult>(item.clone()).ok())
        .collect()
}
