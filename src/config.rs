//! Configuration management for the relay
//!
//! Configuration is loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Ollama server base URL
    pub ollama_base_url: String,
    /// Default model used when a request does not name one
    pub default_model: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("AIYO_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("AIYO_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid AIYO_PORT")?,

            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            default_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "qwen3:8b".to_string()),
        })
    }
}
