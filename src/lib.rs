//! AIYO relay - streaming chat relay for the AIYO travel planner
//!
//! This library relays chat requests to a local Ollama server and
//! re-encodes its newline-delimited JSON stream as Server-Sent Events. The
//! consumer-side pieces (SSE reader, message accumulator, markdown
//! sanitizer) live here too so a Rust client can reconstruct and safely
//! render the streamed reply.

pub mod client;
pub mod config;
pub mod error;
pub mod render;
pub mod routes;
pub mod streaming;
pub mod transcript;
pub mod upstream;

use std::time::Instant;

use anyhow::Result;

pub use crate::client::{AssistantMessage, SseReader};
pub use crate::config::Config;
pub use crate::render::markdown_to_safe_html;
pub use crate::streaming::{FrameDecoder, RelayEvent};
pub use crate::transcript::{ChatTurn, Role};
pub use crate::upstream::OllamaClient;

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub start_time: Instant,
    pub ollama: OllamaClient,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // One pooled client for all upstream traffic. No request timeout:
        // a streaming completion may legitimately run for minutes.
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(16)
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        let ollama = OllamaClient::new(http_client.clone(), &config);

        Ok(Self {
            config,
            http_client,
            start_time: Instant::now(),
            ollama,
        })
    }
}
