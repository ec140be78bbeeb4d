//! Upstream record interpretation
//!
//! Each complete record is parsed as an Ollama chat chunk and translated
//! into the relay's event vocabulary. Records that fail to parse are
//! treated as noise (the upstream may interleave keep-alives), not errors.

use serde::Deserialize;

/// One newline-delimited record from the Ollama `/api/chat` stream.
///
/// All fields are optional; a record carrying none of them is a no-op.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamChunk {
    #[serde(default)]
    pub message: Option<UpstreamMessage>,
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Message payload inside an upstream chunk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Canonical event vocabulary crossing the SSE boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// One increment of assistant text, in generation order
    Token(String),
    /// The upstream marked the response complete
    Done,
    /// The upstream reported a failure mid-stream
    Error(String),
}

/// Interpret one record as zero or more relay events.
///
/// An `error` field wins over content in the same record. A record can
/// carry both a final token and the terminal marker, so the result is an
/// ordered list: `Token` first, then `Done`.
pub fn interpret_record(record: &str) -> Vec<RelayEvent> {
    let chunk: UpstreamChunk = match serde_json::from_str(record) {
        Ok(chunk) => chunk,
        Err(_) => return Vec::new(),
    };

    let mut events = Vec::new();

    if let Some(error) = chunk.error {
        events.push(RelayEvent::Error(error));
    } else if let Some(content) = chunk.message.and_then(|m| m.content) {
        if !content.is_empty() {
            events.push(RelayEvent::Token(content));
        }
    }

    if chunk.done == Some(true) {
        events.push(RelayEvent::Done);
    }

    events
}
