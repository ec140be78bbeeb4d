//! HTTP client for the Ollama server
//!
//! Wraps the two upstream endpoints the relay consumes: the streaming
//! `/api/chat` completion and the read-only `/api/tags` model list.

use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    transcript::ChatTurn,
};

/// Byte stream of one upstream response body
pub type UpstreamByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Request body for `POST /api/chat`
#[derive(Debug, Serialize)]
struct ChatStreamRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: &'a [ChatTurn],
}

/// Response body of `GET /api/tags`
#[derive(Debug, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagModel>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TagModel {
    #[serde(default)]
    pub name: Option<String>,
}

/// Ollama client
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.ollama_base_url.clone(),
        }
    }

    /// Start a streaming chat completion.
    ///
    /// A non-success status or an unreachable server is surfaced as
    /// [`AppError::UpstreamUnreachable`] carrying the upstream body text
    /// when there is one; streaming never begins on that path.
    pub async fn chat_stream(
        &self,
        model: &str,
        messages: &[ChatTurn],
    ) -> AppResult<UpstreamByteStream> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(url = %url, model = %model, messages = messages.len(), "Opening upstream chat stream");

        let response = self
            .client
            .post(&url)
            .json(&ChatStreamRequest {
                model,
                stream: true,
                messages,
            })
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Upstream connection failed");
                AppError::UpstreamUnreachable(format!("無法連線模型服務：{e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            let message = if detail.trim().is_empty() {
                format!("無法連線模型服務（{}）。", status.as_u16())
            } else {
                detail
            };
            return Err(AppError::UpstreamUnreachable(message));
        }

        Ok(Box::pin(response.bytes_stream()))
    }

    /// Fetch the installed model list.
    pub async fn list_models(&self) -> AppResult<TagsResponse> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::UpstreamUnreachable(format!(
                "無法取得模型清單（{}）。",
                response.status().as_u16()
            )));
        }

        let tags = response.json::<TagsResponse>().await?;
        Ok(tags)
    }
}
