//! Streaming pipeline between the Ollama wire format and SSE
//!
//! The upstream body arrives as chunked bytes carrying newline-delimited
//! JSON records. [`decoder`] reassembles records across chunk boundaries,
//! [`event`] interprets each record as relay events, and [`encoder`] frames
//! those events for the outbound SSE response.

pub mod decoder;
pub mod encoder;
pub mod event;

pub use decoder::FrameDecoder;
pub use encoder::encode_event;
pub use event::{interpret_record, RelayEvent, UpstreamChunk};
