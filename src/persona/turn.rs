// src/persona/turn.rs
//! Conversation history and the turn counter derived from it.

use serde::{Deserialize, Serialize};

/// Only the most recent entries count towards the turn number or get sent upstream.
pub const HISTORY_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(()),
        }
    }
}

/// One entry of the client-supplied history. Order is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    /// Base64 payload or data URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            image: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// The tail of `history` that is considered at all.
pub fn recent_window(history: &[ConversationTurn]) -> &[ConversationTurn] {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    &history[start..]
}

/// `floor(len / 2) + 1` over the recent window.
///
/// Alternation of user/assistant entries is assumed, not checked; a skewed
/// history just yields a slightly off count.
pub fn turn_number(history: &[ConversationTurn]) -> u32 {
    let completed = recent_window(history).len() / 2;
    // HISTORY_WINDOW keeps this far below u32::MAX
    completed as u32 + 1
}
