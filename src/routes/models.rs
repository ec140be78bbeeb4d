//! Models endpoint
//!
//! Lists the models installed on the Ollama server. This endpoint never
//! fails: when the upstream is unreachable the configured default model is
//! returned alone, so the frontend can still populate its selector.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// One selectable model
#[derive(Debug, Clone, Serialize)]
pub struct ModelOption {
    pub name: String,
}

/// Models list response
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelOption>,
    pub selected: String,
}

/// List available models with the currently selected default.
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let configured = state.config.default_model.clone();

    let mut names: Vec<String> = match state.ollama.list_models().await {
        Ok(tags) => {
            let mut seen = Vec::new();
            for model in tags.models {
                if let Some(name) = model.name {
                    if !seen.contains(&name) {
                        seen.push(name);
                    }
                }
            }
            seen
        }
        Err(e) => {
            warn!(error = %e, "Model list unavailable, falling back to configured default");
            Vec::new()
        }
    };

    if names.is_empty() && !configured.is_empty() {
        names.push(configured.clone());
    }

    // The configured default stays selected even when the upstream listing
    // does not include it; the first listed model is only a last resort.
    let selected = if configured.is_empty() {
        names.first().cloned().unwrap_or_default()
    } else {
        configured
    };

    Json(ModelsResponse {
        models: names.into_iter().map(|name| ModelOption { name }).collect(),
        selected,
    })
}
