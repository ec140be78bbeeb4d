//! Consumer-side building blocks for the relay's SSE stream
//!
//! A client reads the relay response incrementally: [`reader`] reassembles
//! `data:` frames from arbitrary byte chunks, [`message`] accumulates the
//! growing assistant reply and renders it through the markdown sanitizer.
//!
//! Unlike the server-side decoder, which tolerates upstream noise, the
//! reader treats a malformed relay frame as fatal for the turn: the relay's
//! own frames are part of this system's contract.

pub mod message;
pub mod reader;

pub use message::AssistantMessage;
pub use reader::{read_response, ChatStreamError, SseFrame, SseReader};
