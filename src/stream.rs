//! Streaming ingestion engine.
//!
//! DESIGN
//! ======
//! The backend streams chat replies as marker-prefixed lines, one JSON frame
//! per line: `data: {"type": "chunk"|"done"|"error", ...}`. The transport
//! delivers opaque byte chunks — a chunk may carry zero, one, or many frames,
//! and a frame may be split across two chunks. [`FrameParser`] owns the
//! carry-over buffer and is pure (testable without I/O); [`events`] adapts a
//! byte stream into a lazy, finite, non-restartable sequence of typed events
//! ending at the first terminal frame.
//!
//! Malformed frames are logged and skipped, never fatal. End-of-stream (or a
//! transport error) before a terminal frame yields a synthesized error event.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::warn;

use crate::gateway::types::ChatResponse;

/// Marker prefixing every protocol frame line.
const FRAME_MARKER: &str = "data: ";

/// Event payload when the transport dies before a terminal frame.
pub const STREAM_INTERRUPTED: &str = "response stream ended before completion";

// =============================================================================
// EVENTS
// =============================================================================

/// One typed event reduced from the wire stream.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Incremental answer fragment to append to the in-progress reply.
    Chunk(String),
    /// Terminal: the final structured response.
    Done(ChatResponse),
    /// Terminal: the stream failed; payload is a diagnostic message.
    Error(String),
}

impl StreamEvent {
    /// Terminal events end the sequence.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done(_) | StreamEvent::Error(_))
    }
}

// Wire shape of one `data: ` payload.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireFrame {
    Chunk {
        #[serde(default)]
        content: String,
    },
    Done {
        #[serde(flatten)]
        response: ChatResponse,
    },
    Error {
        #[serde(default, alias = "detail")]
        message: String,
    },
}

// =============================================================================
// PARSER
// =============================================================================

/// Incremental frame parser with an explicit carry-over buffer.
///
/// Feed it decoded text in arbitrary slices. Complete marker lines become
/// events; an unterminated trailing line is retained and re-prefixed to the
/// next push rather than parsed early.
#[derive(Debug, Default)]
pub struct FrameParser {
    carry: String,
}

impl FrameParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one transport chunk, returning the events it completes.
    pub fn push(&mut self, chunk: &str) -> Vec<StreamEvent> {
        self.carry.push_str(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.carry.find('\n') {
            let line: String = self.carry.drain(..=pos).collect();
            if let Some(event) = parse_line(line.trim_end_matches(['\r', '\n'])) {
                events.push(event);
            }
        }
        events
    }

    /// True while a partial line is buffered awaiting its newline.
    #[must_use]
    pub fn has_partial(&self) -> bool {
        !self.carry.is_empty()
    }
}

fn parse_line(line: &str) -> Option<StreamEvent> {
    // Blank lines and non-marker lines are transport framing, not frames.
    let payload = line.strip_prefix(FRAME_MARKER)?;

    match serde_json::from_str::<WireFrame>(payload) {
        Ok(WireFrame::Chunk { content }) => Some(StreamEvent::Chunk(content)),
        Ok(WireFrame::Done { response }) => Some(StreamEvent::Done(response)),
        Ok(WireFrame::Error { message }) => {
            let message = if message.is_empty() {
                "gateway reported a stream error".to_owned()
            } else {
                message
            };
            Some(StreamEvent::Error(message))
        }
        Err(e) => {
            warn!(error = %e, payload, "skipping malformed stream frame");
            None
        }
    }
}

// =============================================================================
// INGESTION
// =============================================================================

struct Ingest<S> {
    inner: S,
    parser: FrameParser,
    ready: VecDeque<StreamEvent>,
    finished: bool,
}

/// Adapt a byte stream into a lazy, finite sequence of [`StreamEvent`]s.
///
/// The sequence ends immediately after the first terminal event; frames
/// arriving after it are dropped. A transport error or end-of-stream without
/// a terminal frame yields a final [`StreamEvent::Error`].
pub fn events<S, E>(bytes: S) -> impl Stream<Item = StreamEvent> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin + 'static,
    E: std::fmt::Display,
{
    let state = Ingest { inner: bytes, parser: FrameParser::new(), ready: VecDeque::new(), finished: false };

    futures::stream::unfold(state, |mut st| async move {
        loop {
            if st.finished {
                return None;
            }
            if let Some(event) = st.ready.pop_front() {
                if event.is_terminal() {
                    st.finished = true;
                }
                return Some((event, st));
            }
            match st.inner.next().await {
                Some(Ok(chunk)) => {
                    let text = String::from_utf8_lossy(&chunk);
                    st.ready.extend(st.parser.push(&text));
                }
                Some(Err(e)) => {
                    warn!(error = %e, "stream transport error");
                    st.ready.push_back(StreamEvent::Error(STREAM_INTERRUPTED.to_owned()));
                }
                None => {
                    st.ready.push_back(StreamEvent::Error(STREAM_INTERRUPTED.to_owned()));
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;
