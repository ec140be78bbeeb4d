//! Common test utilities for the relay
//!
//! Shared fixtures for integration tests: a router wired against a mock
//! Ollama server and helpers for stubbing its two endpoints.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aiyo_relay::{routes, AppState, Config};

/// Build a config pointing at the given mock Ollama URL
pub fn test_config(ollama_url: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ollama_base_url: ollama_url.to_string(),
        default_model: "qwen3:8b".to_string(),
    }
}

/// Spin up a test server for the relay router against the given upstream
pub fn test_server(ollama_url: &str) -> TestServer {
    let state = Arc::new(AppState::new(test_config(ollama_url)).expect("app state"));
    TestServer::new(routes::create_router(state)).expect("test server")
}

/// Stub a streaming chat completion with a raw newline-delimited JSON body
pub async fn mock_chat_stream(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.as_bytes().to_vec(), "application/x-ndjson"),
        )
        .mount(server)
        .await;
}

/// Stub a failing chat completion
pub async fn mock_chat_failure(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Stub the installed-models listing
pub async fn mock_tags(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
