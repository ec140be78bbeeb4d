//! SSE framing for relay events
//!
//! Every event becomes exactly one `data: <json>\n\n` frame. Token and
//! error text is model-controlled, so it only ever reaches the wire through
//! JSON string serialization; newlines and quotes can never break a frame.

use bytes::Bytes;
use serde::Serialize;

use super::event::RelayEvent;

#[derive(Debug, Serialize)]
struct TokenFrame<'a> {
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct DoneFrame {
    done: bool,
}

#[derive(Debug, Serialize)]
struct ErrorFrame<'a> {
    error: &'a str,
}

/// Encode one relay event as an SSE frame.
pub fn encode_event(event: &RelayEvent) -> Bytes {
    let json = match event {
        RelayEvent::Token(token) => serde_json::to_string(&TokenFrame { token }),
        RelayEvent::Done => serde_json::to_string(&DoneFrame { done: true }),
        RelayEvent::Error(error) => serde_json::to_string(&ErrorFrame { error }),
    }
    .expect("relay frames always serialize");

    Bytes::from(format!("data: {json}\n\n"))
}
