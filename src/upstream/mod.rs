//! Ollama upstream client

pub mod client;

pub use client::{OllamaClient, TagsResponse};
