//! Error types for the relay
//!
//! The frontend expects a flat `{"error": "..."}` JSON body on every
//! non-streaming failure, so the response mapping here is deliberately
//! simpler than a code/message envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Request rejected before any upstream call was made
    #[error("{0}")]
    BadRequest(String),

    /// Upstream refused the connection, returned a non-success status,
    /// or sent no body. Streaming never started.
    #[error("{0}")]
    UpstreamUnreachable(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body, matching the frontend contract
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::UpstreamUnreachable(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Http(e) => (StatusCode::BAD_GATEWAY, format!("無法連線模型服務：{e}")),
            AppError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("聊天請求失敗：{e}")),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_bad_request_body_shape() {
        let response = AppError::BadRequest("請輸入聊天內容。".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, serde_json::json!({"error": "請輸入聊天內容。"}));
    }

    #[tokio::test]
    async fn test_upstream_unreachable_is_502() {
        let response =
            AppError::UpstreamUnreachable("無法連線模型服務（500）。".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
