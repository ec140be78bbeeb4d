//! Assistant message accumulation
//!
//! One accumulator exists per in-flight response. It grows on every token
//! and is sealed on completion or failure; a sealed message never changes.

use crate::render::markdown_to_safe_html;

/// Accumulator for one streamed assistant reply
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssistantMessage {
    content: String,
    sealed: bool,
}

impl AssistantMessage {
    /// Create an empty accumulator for a new response
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one token. Appends to a sealed message are ignored.
    pub fn push_token(&mut self, token: &str) {
        if !self.sealed {
            self.content.push_str(token);
        }
    }

    /// Seal the message; no further tokens are accepted.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// The accumulated plain text so far
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Render the accumulated text as sanitized HTML.
    ///
    /// Safe to call after every token; the renderer handles arbitrarily
    /// truncated input.
    pub fn to_safe_html(&self) -> String {
        markdown_to_safe_html(&self.content)
    }

    /// Consume the accumulator, returning the final text
    pub fn into_string(self) -> String {
        self.content
    }
}
