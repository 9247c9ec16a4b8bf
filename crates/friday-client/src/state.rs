//! Render state for one turn.
//!
//! [`RenderState`] is the single mutable resource of a turn, exclusively
//! owned by the session controller. Decoded events fold into it in arrival
//! order via [`RenderState::apply`]; the fold is synchronous, never panics,
//! and becomes a no-op once a terminal event has been applied.

use std::time::Duration;

use friday_protocol::StreamEvent;
use serde::{Deserialize, Serialize};

/// Lifecycle of one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// Request issued, no response bytes yet.
    Pending,
    /// Response body open, events arriving.
    Streaming,
    /// Terminated gracefully with a `done` event.
    Done,
    /// Terminated with an error (in-band or transport).
    Error,
}

/// One collected source from a `search_result` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Source URL.
    pub url: String,
    /// Page title; falls back to the URL when the result carried none.
    pub title: String,
}

/// Accumulated render state for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Ordered events accepted so far (append-only within a turn).
    pub parts: Vec<StreamEvent>,
    /// True from turn start until the first visible content arrives.
    pub thinking: bool,
    /// Sources collected from `search_result` events, in arrival order.
    pub sources: Vec<Source>,
    /// Current turn status.
    pub status: TurnStatus,
    /// Error message once `status == Error`.
    pub error: Option<String>,
    /// Wall-clock elapsed time, set once at termination.
    pub duration: Option<Duration>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderState {
    /// Creates the state for a fresh turn.
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            thinking: true,
            sources: Vec::new(),
            status: TurnStatus::Pending,
            error: None,
            duration: None,
        }
    }

    /// Returns true once the turn has reached `done` or `error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, TurnStatus::Done | TurnStatus::Error)
    }

    /// Folds one decoded event into the state.
    ///
    /// Events arriving after a terminal event are ignored. `done` is not
    /// appended to `parts`; `error` is, so it renders inline.
    pub fn apply(&mut self, event: StreamEvent) {
        if self.is_terminal() {
            return;
        }
        match event {
            StreamEvent::Done {} => {
                self.thinking = false;
                self.status = TurnStatus::Done;
            }
            StreamEvent::Error(data) => {
                self.thinking = false;
                self.error = Some(data.message.clone());
                self.status = TurnStatus::Error;
                self.parts.push(StreamEvent::Error(data));
            }
            StreamEvent::Text(_) => {
                self.thinking = false;
                self.parts.push(event);
            }
            StreamEvent::SearchResult(ref result) => {
                self.thinking = false;
                self.sources.push(Source {
                    url: result.url.clone(),
                    title: result
                        .title
                        .clone()
                        .unwrap_or_else(|| result.url.clone()),
                });
                self.parts.push(event);
            }
            StreamEvent::ToolCall(_) | StreamEvent::ToolResponse(_) => {
                self.parts.push(event);
            }
        }
    }

    /// Concatenated text of all `text` parts accepted so far.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(StreamEvent::as_text)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use friday_protocol::{ErrorData, SearchResult};
    use serde_json::json;

    fn streaming_state() -> RenderState {
        let mut state = RenderState::new();
        state.status = TurnStatus::Streaming;
        state
    }

    #[test]
    fn test_new_turn_is_pending_and_thinking() {
        let state = RenderState::new();
        assert_eq!(state.status, TurnStatus::Pending);
        assert!(state.thinking);
        assert!(state.parts.is_empty());
        assert!(state.sources.is_empty());
    }

    #[test]
    fn test_text_clears_thinking_and_appends() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Text("Hi".into()));
        assert!(!state.thinking);
        assert_eq!(state.parts.len(), 1);
        assert_eq!(state.text(), "Hi");
    }

    #[test]
    fn test_tool_call_keeps_thinking() {
        let mut state = streaming_state();
        state.apply(StreamEvent::ToolCall(json!([{"name": "googleSearch"}])));
        assert!(state.thinking);
        assert_eq!(state.parts.len(), 1);
    }

    #[test]
    fn test_search_result_collects_source_with_title_fallback() {
        let mut state = streaming_state();
        state.apply(StreamEvent::SearchResult(
            SearchResult::new("https://x.test").with_title("X"),
        ));
        state.apply(StreamEvent::SearchResult(SearchResult::new(
            "https://untitled.test",
        )));

        assert!(!state.thinking);
        assert_eq!(state.sources.len(), 2);
        assert_eq!(state.sources[0].title, "X");
        assert_eq!(state.sources[1].title, "https://untitled.test");
    }

    #[test]
    fn test_done_is_terminal_and_not_appended() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Text("Hi".into()));
        state.apply(StreamEvent::Done {});
        assert_eq!(state.status, TurnStatus::Done);
        assert_eq!(state.parts.len(), 1);
    }

    #[test]
    fn test_error_is_terminal_and_rendered_inline() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Error(ErrorData::new("boom")));
        assert_eq!(state.status, TurnStatus::Error);
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert_eq!(state.parts.len(), 1);
    }

    #[test]
    fn test_append_only_until_terminal() {
        let mut state = streaming_state();
        let events = [
            StreamEvent::Text("a".into()),
            StreamEvent::ToolCall(json!({})),
            StreamEvent::SearchResult(SearchResult::new("https://x.test")),
            StreamEvent::ToolResponse(json!({"name": "other"})),
            StreamEvent::Text("b".into()),
        ];
        for event in events.clone() {
            state.apply(event);
        }
        assert_eq!(state.parts.len(), events.len());
    }

    #[test]
    fn test_events_after_terminal_are_ignored() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Done {});
        let frozen = state.clone();

        state.apply(StreamEvent::Text("late".into()));
        state.apply(StreamEvent::Error(ErrorData::new("late error")));
        state.apply(StreamEvent::Done {});

        assert_eq!(state, frozen);
    }
}
