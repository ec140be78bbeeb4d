//! Chat relay endpoint
//!
//! Accepts a chat request, opens a streaming completion against the Ollama
//! server, and re-encodes the upstream newline-delimited JSON records as a
//! Server-Sent-Events response. Tokens are written downstream as soon as
//! they are interpreted; nothing is batched across records.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    streaming::{encode_event, interpret_record, FrameDecoder, RelayEvent},
    transcript::{build_messages, ChatTurn},
    AppState,
};

/// Chat request body from the frontend
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatTurn>>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Handle a chat request with a streaming SSE response.
///
/// Validation failures and upstream connection failures are returned as
/// plain JSON errors before any stream is committed; once streaming has
/// begun, failures travel inside the stream as `error` frames.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Response> {
    // An unreadable body gets the same flat error shape as every other
    // pre-stream failure, not axum's plain-text rejection.
    let Json(request) = request.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    if message.is_empty() {
        return Err(AppError::BadRequest("請輸入聊天內容。".to_string()));
    }

    let model = request
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(&state.config.default_model)
        .to_string();

    let history = request.messages.unwrap_or_default();
    let messages = build_messages(&history, &message);

    info!(
        model = %model,
        history = history.len(),
        "Processing chat request"
    );

    let upstream = state.ollama.chat_stream(&model, &messages).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache, no-transform")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(relay_stream(upstream)))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {e}")))?;

    Ok(response)
}

/// Pull loop driving decoder -> interpreter -> encoder.
///
/// The stream always ends with either a `done` or an `error` frame unless
/// the upstream closed cleanly without a terminal marker. Dropping the
/// stream (client disconnect) drops the upstream body with it, which
/// releases the connection without draining the rest of the response.
fn relay_stream<S, E>(upstream: S) -> impl Stream<Item = Result<Bytes, Infallible>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    async_stream::stream! {
        futures::pin_mut!(upstream);
        let mut decoder = FrameDecoder::new();

        loop {
            match upstream.next().await {
                Some(Ok(chunk)) => {
                    for record in decoder.feed(&chunk) {
                        for event in interpret_record(&record) {
                            yield Ok(encode_event(&event));
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Upstream read failed mid-stream");
                    let message = match e.to_string() {
                        m if m.is_empty() => "模型回應中斷。".to_string(),
                        m => m,
                    };
                    yield Ok(encode_event(&RelayEvent::Error(message)));
                    return;
                }
                None => break,
            }
        }

        // Upstream may omit the trailing separator; a tail that fails to
        // parse is discarded inside interpret_record.
        if let Some(record) = decoder.flush() {
            for event in interpret_record(&record) {
                yield Ok(encode_event(&event));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::io;

    fn byte_stream(
        chunks: Vec<Result<Bytes, io::Error>>,
    ) -> impl Stream<Item = Result<Bytes, io::Error>> {
        stream::iter(chunks)
    }

    async fn collect_frames(upstream: impl Stream<Item = Result<Bytes, io::Error>>) -> String {
        let frames: Vec<_> = relay_stream(upstream).collect().await;
        frames
            .into_iter()
            .map(|frame| String::from_utf8(frame.unwrap().to_vec()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_token_then_done_from_single_record() {
        let body = byte_stream(vec![Ok(Bytes::from_static(
            b"{\"message\":{\"content\":\"done\"},\"done\":true}\n",
        ))]);

        let output = collect_frames(body).await;
        assert_eq!(
            output,
            "data: {\"token\":\"done\"}\n\ndata: {\"done\":true}\n\n"
        );
    }

    #[tokio::test]
    async fn test_record_split_across_chunks() {
        let body = byte_stream(vec![
            Ok(Bytes::from_static(b"{\"message\":{\"content\":\"he")),
            Ok(Bytes::from_static(b"llo\"}}\n{\"done\":true}\n")),
        ]);

        let output = collect_frames(body).await;
        assert_eq!(
            output,
            "data: {\"token\":\"hello\"}\n\ndata: {\"done\":true}\n\n"
        );
    }

    #[tokio::test]
    async fn test_malformed_record_skipped() {
        let body = byte_stream(vec![Ok(Bytes::from_static(
            b"not json\n{\"message\":{\"content\":\"ok\"}}\n",
        ))]);

        let output = collect_frames(body).await;
        assert_eq!(output, "data: {\"token\":\"ok\"}\n\n");
    }

    #[tokio::test]
    async fn test_unterminated_tail_flushed() {
        let body = byte_stream(vec![Ok(Bytes::from_static(
            b"{\"message\":{\"content\":\"tail\"}}",
        ))]);

        let output = collect_frames(body).await;
        assert_eq!(output, "data: {\"token\":\"tail\"}\n\n");
    }

    #[tokio::test]
    async fn test_truncated_tail_discarded() {
        let body = byte_stream(vec![Ok(Bytes::from_static(
            b"{\"message\":{\"content\":\"full\"}}\n{\"message\":{\"content\":\"trun",
        ))]);

        let output = collect_frames(body).await;
        assert_eq!(output, "data: {\"token\":\"full\"}\n\n");
    }

    #[tokio::test]
    async fn test_transport_failure_synthesizes_error_frame() {
        let body = byte_stream(vec![
            Ok(Bytes::from_static(b"{\"message\":{\"content\":\"a\"}}\n")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
        ]);

        let output = collect_frames(body).await;
        assert_eq!(
            output,
            "data: {\"token\":\"a\"}\n\ndata: {\"error\":\"connection reset\"}\n\n"
        );
    }

    #[tokio::test]
    async fn test_upstream_error_record_becomes_error_frame() {
        let body = byte_stream(vec![Ok(Bytes::from_static(
            b"{\"message\":{\"content\":\"a\"}}\n{\"error\":\"out of memory\"}\n",
        ))]);

        let output = collect_frames(body).await;
        assert_eq!(
            output,
            "data: {\"token\":\"a\"}\n\ndata: {\"error\":\"out of memory\"}\n\n"
        );
    }
}
