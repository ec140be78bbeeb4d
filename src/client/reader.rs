//! SSE frame reassembly on the consuming side
//!
//! Mirror of the server-side frame decoder, keyed on `data:` lines. Frames
//! may arrive split across reads; the reader buffers bytes until a line
//! completes. A payload that fails to parse ends the turn with
//! 「回應解析失敗。」, and an `error` payload is raised as the terminal
//! failure.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use thiserror::Error;

use super::message::AssistantMessage;

/// Terminal failures while consuming one relay response
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatStreamError {
    /// The relay reported an error frame
    #[error("{0}")]
    Relay(String),

    /// A `data:` payload could not be parsed
    #[error("回應解析失敗。")]
    MalformedFrame,

    /// The connection failed while reading the response
    #[error("{0}")]
    Transport(String),
}

/// One well-formed frame from the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// An increment of assistant text
    Token(String),
    /// The response is complete
    Done,
}

#[derive(Debug, Default, Deserialize)]
struct RelayPayload {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

/// Incremental reader for the relay's SSE byte stream
#[derive(Debug, Default)]
pub struct SseReader {
    /// Bytes after the last complete line
    tail: Vec<u8>,
}

impl SseReader {
    /// Create a new empty reader
    pub fn new() -> Self {
        Self { tail: Vec::new() }
    }

    /// Feed bytes and return the frames completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<SseFrame>, ChatStreamError> {
        self.tail.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(pos) = self.tail.iter().position(|&b| b == b'\n') {
            let rest = self.tail.split_off(pos + 1);
            self.tail.pop();
            let line = std::mem::replace(&mut self.tail, rest);

            if let Some(frame) = Self::parse_line(&line)? {
                frames.push(frame);
            }
        }

        Ok(frames)
    }

    /// Consume the reader at end of stream, handling a final unterminated
    /// `data:` line.
    pub fn finish(self) -> Result<Option<SseFrame>, ChatStreamError> {
        if self.tail.is_empty() {
            return Ok(None);
        }
        Self::parse_line(&self.tail)
    }

    fn parse_line(line: &[u8]) -> Result<Option<SseFrame>, ChatStreamError> {
        let line = String::from_utf8_lossy(line);
        let Some(payload_text) = line.strip_prefix("data:") else {
            // Blank separator lines and SSE comments carry no payload.
            return Ok(None);
        };
        let payload_text = payload_text.trim();
        if payload_text.is_empty() {
            return Ok(None);
        }

        let payload: RelayPayload =
            serde_json::from_str(payload_text).map_err(|_| ChatStreamError::MalformedFrame)?;

        if let Some(error) = payload.error {
            return Err(ChatStreamError::Relay(error));
        }
        if let Some(token) = payload.token {
            if !token.is_empty() {
                return Ok(Some(SseFrame::Token(token)));
            }
        }
        if payload.done == Some(true) {
            return Ok(Some(SseFrame::Done));
        }
        Ok(None)
    }
}

/// Drive a full relay response into one assistant message.
///
/// Tokens are appended in arrival order; the message is sealed on a `done`
/// frame or at end of stream. Any terminal failure discards nothing the
/// caller already observed, it simply ends the turn.
pub async fn read_response<S, E>(stream: S) -> Result<AssistantMessage, ChatStreamError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    futures::pin_mut!(stream);

    let mut reader = SseReader::new();
    let mut message = AssistantMessage::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ChatStreamError::Transport(e.to_string()))?;
        for frame in reader.feed(&chunk)? {
            apply_frame(&mut message, frame);
        }
        if message.is_sealed() {
            return Ok(message);
        }
    }

    if let Some(frame) = reader.finish()? {
        apply_frame(&mut message, frame);
    }
    message.seal();
    Ok(message)
}

fn apply_frame(message: &mut AssistantMessage, frame: SseFrame) {
    match frame {
        SseFrame::Token(token) => message.push_token(&token),
        SseFrame::Done => message.seal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::io;

    #[test]
    fn test_frame_split_across_reads() {
        let mut reader = SseReader::new();
        assert_eq!(reader.feed(b"data: {\"tok").unwrap(), vec![]);
        assert_eq!(
            reader.feed(b"en\":\"hi\"}\n\n").unwrap(),
            vec![SseFrame::Token("hi".to_string())]
        );
    }

    #[test]
    fn test_split_invariance_at_every_byte_offset() {
        let body = "data: {\"token\":\"台南\"}\n\ndata: {\"done\":true}\n\n".as_bytes();

        let mut reference = SseReader::new();
        let expected = reference.feed(body).unwrap();

        for offset in 0..=body.len() {
            let mut reader = SseReader::new();
            let mut frames = reader.feed(&body[..offset]).unwrap();
            frames.extend(reader.feed(&body[offset..]).unwrap());
            assert_eq!(frames, expected, "split at byte {offset}");
        }
    }

    #[test]
    fn test_non_data_lines_skipped() {
        let mut reader = SseReader::new();
        let frames = reader
            .feed(b": keep-alive\n\ndata: {\"token\":\"a\"}\n\n")
            .unwrap();
        assert_eq!(frames, vec![SseFrame::Token("a".to_string())]);
    }

    #[test]
    fn test_malformed_payload_is_fatal() {
        let mut reader = SseReader::new();
        let result = reader.feed(b"data: {not json}\n\n");
        assert_eq!(result, Err(ChatStreamError::MalformedFrame));
    }

    #[test]
    fn test_error_payload_is_terminal() {
        let mut reader = SseReader::new();
        let result = reader.feed(b"data: {\"error\":\"out of memory\"}\n\n");
        assert_eq!(result, Err(ChatStreamError::Relay("out of memory".to_string())));
    }

    #[test]
    fn test_finish_handles_unterminated_frame() {
        let mut reader = SseReader::new();
        assert!(reader.feed(b"data: {\"token\":\"tail\"}").unwrap().is_empty());
        assert_eq!(
            reader.finish().unwrap(),
            Some(SseFrame::Token("tail".to_string()))
        );
    }

    #[tokio::test]
    async fn test_read_response_accumulates_and_seals() {
        let chunks: Vec<Result<Bytes, io::Error>> = vec![
            Ok(Bytes::from_static(b"data: {\"token\":\"Hello\"}\n\nda")),
            Ok(Bytes::from_static(b"ta: {\"token\":\" world\"}\n\n")),
            Ok(Bytes::from_static(b"data: {\"done\":true}\n\n")),
        ];

        let message = read_response(stream::iter(chunks)).await.unwrap();
        assert!(message.is_sealed());
        assert_eq!(message.as_str(), "Hello world");
    }

    #[tokio::test]
    async fn test_read_response_seals_on_stream_end_without_done() {
        let chunks: Vec<Result<Bytes, io::Error>> =
            vec![Ok(Bytes::from_static(b"data: {\"token\":\"partial\"}\n\n"))];

        let message = read_response(stream::iter(chunks)).await.unwrap();
        assert!(message.is_sealed());
        assert_eq!(message.as_str(), "partial");
    }

    #[tokio::test]
    async fn test_read_response_surfaces_relay_error() {
        let chunks: Vec<Result<Bytes, io::Error>> = vec![
            Ok(Bytes::from_static(b"data: {\"token\":\"a\"}\n\n")),
            Ok(Bytes::from_static(b"data: {\"error\":\"boom\"}\n\n")),
        ];

        let result = read_response(stream::iter(chunks)).await;
        assert_eq!(result.unwrap_err(), ChatStreamError::Relay("boom".to_string()));
    }

    #[tokio::test]
    async fn test_read_response_surfaces_transport_error() {
        let chunks: Vec<Result<Bytes, io::Error>> = vec![
            Ok(Bytes::from_static(b"data: {\"token\":\"a\"}\n\n")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
        ];

        let result = read_response(stream::iter(chunks)).await;
        assert!(matches!(result, Err(ChatStreamError::Transport(_))));
    }
}
