//! Chat transcript types and request assembly
//!
//! A transcript is an ordered sequence of turns. Before a request goes
//! upstream it is trimmed to the most recent [`HISTORY_LIMIT`] turns and a
//! system turn is prepended; the system turn is always first and never
//! counts against the cap.

use serde::{Deserialize, Serialize};

/// Maximum number of history turns sent upstream, system turn excluded.
pub const HISTORY_LIMIT: usize = 20;

/// System prompt injected as the first message of every upstream request.
pub const SYSTEM_PROMPT: &str =
    "你是 AIYO 旅遊助理。你必須全程使用繁體中文回覆，不可使用簡體中文。\
     回覆內容需清楚、實用，必要時可使用 Markdown 格式。";

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Assemble the message sequence for one upstream request.
///
/// Blank history turns are dropped. The new user message is appended only
/// when the remaining history does not already end with it, then the tail
/// is capped at [`HISTORY_LIMIT`] turns and the system turn is prepended.
pub fn build_messages(history: &[ChatTurn], message: &str) -> Vec<ChatTurn> {
    let mut valid: Vec<ChatTurn> = history
        .iter()
        .filter(|turn| !turn.content.trim().is_empty())
        .cloned()
        .collect();

    if valid.last().map(|turn| turn.content.as_str()) != Some(message) {
        valid.push(ChatTurn::user(message));
    }

    let tail_start = valid.len().saturating_sub(HISTORY_LIMIT);

    let mut messages = Vec::with_capacity(valid.len() - tail_start + 1);
    messages.push(ChatTurn::system(SYSTEM_PROMPT));
    messages.extend(valid.drain(tail_start..));
    messages
}
