//! Friday Client
//!
//! Client-side pipeline for the Friday streaming protocol:
//!
//! - **Render state**: [`RenderState`] and its event reducer
//! - **Session control**: [`ChatClient`] drives one turn per call
//!
//! # Usage
//!
//! ```rust,ignore
//! use friday_client::{ChatClient, TurnRequest};
//!
//! let client = ChatClient::new("http://localhost:3040/api/ai");
//! let state = client
//!     .send_turn(&TurnRequest::new("Hello").with_search(), |state| {
//!         // re-render on every applied event
//!         println!("{}", state.text());
//!     })
//!     .await;
//! assert!(state.is_terminal());
//! ```

pub mod error;
pub mod session;
pub mod state;

// Re-export protocol types clients commonly match on
pub use friday_protocol::{ErrorData, EventKind, SearchResult, StreamEvent};

pub use error::{ClientError, Result};
pub use session::{ChatClient, TurnRequest};
pub use state::{RenderState, Source, TurnStatus};
