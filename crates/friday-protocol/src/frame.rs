//! Frame codec for the Friday streaming protocol.
//!
//! A frame is one SSE-shaped block:
//!
//! ```text
//! event: message
//! data: {"type": "text", "data": "Hello"}
//!
//! ```
//!
//! Frames are delimited by a double newline. [`FrameDecoder`] reassembles
//! frames from a raw byte stream, tolerating frames (and multi-byte UTF-8
//! characters) split across network reads.

use tracing::warn;

use crate::error::Result;
use crate::event::StreamEvent;

/// Boundary between frames on the wire.
pub const FRAME_DELIMITER: &str = "\n\n";

/// Marker line that opens every meaningful frame.
pub const EVENT_MARKER: &str = "event: message";

/// Prefix of the payload line inside a frame.
pub const DATA_PREFIX: &str = "data: ";

/// Serializes an event into a complete wire frame.
///
/// Returns the frame including its trailing delimiter, ready to be written
/// to the outbound stream.
pub fn encode_frame(event: &StreamEvent) -> Result<String> {
    let json = serde_json::to_string(event)?;
    Ok(format!("{EVENT_MARKER}\n{DATA_PREFIX}{json}{FRAME_DELIMITER}"))
}

/// Extracts the payload of the `data:` line from a frame, if present.
///
/// Tolerates a missing space after the colon, per the SSE field syntax.
pub fn data_line(frame: &str) -> Option<&str> {
    frame
        .lines()
        .find_map(|line| line.strip_prefix("data:"))
        .map(|payload| payload.strip_prefix(' ').unwrap_or(payload))
}

/// Incremental frame decoder.
///
/// Feed raw byte chunks in arrival order; complete frames are returned in
/// the same order, each exactly once. Partial input is buffered until the
/// next call observes a frame boundary.
///
/// # Example
///
/// ```rust
/// use friday_protocol::FrameDecoder;
///
/// let mut decoder = FrameDecoder::new();
/// assert!(decoder.feed(b"event: message\nda").is_empty());
/// let frames = decoder.feed(b"ta: {\"type\":\"done\",\"data\":{}}\n\n");
/// assert_eq!(frames.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes of a trailing incomplete UTF-8 sequence from the previous chunk.
    carry: Vec<u8>,
    /// Decoded text not yet terminated by a frame boundary.
    buffer: String,
}

impl FrameDecoder {
    /// Creates a new decoder with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk of raw bytes, returning all frames completed by it.
    ///
    /// Frames are returned without their trailing delimiter. An invalid
    /// (non-UTF-8) byte sequence is replaced with U+FFFD and logged; it does
    /// not abort decoding.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(chunk);
        self.decode_carry();

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.find(FRAME_DELIMITER) {
            let frame: String = self.buffer.drain(..end + FRAME_DELIMITER.len()).collect();
            frames.push(frame[..end].to_string());
        }
        frames
    }

    /// Finishes the stream, surfacing any residual partial frame.
    ///
    /// A non-empty residual is logged and returned for diagnostics; it is
    /// never a valid frame.
    pub fn finish(mut self) -> Option<String> {
        self.decode_carry();
        if !self.carry.is_empty() {
            warn!(
                bytes = self.carry.len(),
                "stream ended inside a multi-byte UTF-8 sequence"
            );
            self.buffer.push('\u{FFFD}');
        }
        if self.buffer.trim().is_empty() {
            None
        } else {
            warn!(residual = %self.buffer, "stream ended with unprocessed partial frame");
            Some(self.buffer)
        }
    }

    /// Moves as much of `carry` as possible into the text buffer, keeping
    /// only a trailing incomplete UTF-8 sequence for the next read.
    fn decode_carry(&mut self) {
        let mut bytes = std::mem::take(&mut self.carry);
        loop {
            match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&bytes[..valid]));
                    match err.error_len() {
                        Some(len) => {
                            warn!(offset = valid, "replacing invalid UTF-8 sequence");
                            self.buffer.push('\u{FFFD}');
                            bytes.drain(..valid + len);
                        }
                        None => {
                            // Incomplete trailing sequence; wait for more bytes.
                            bytes.drain(..valid);
                            self.carry = bytes;
                            return;
                        }
                    }
                }
            }
        }
    }
}
