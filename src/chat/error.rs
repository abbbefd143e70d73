use thiserror::Error;

use crate::llm::LlmError;

/// Reasons a chat request does not produce a roast
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Send a message or an image")]
    EmptyInput,

    #[error("Roasting is paused for safety. Try again in {minutes_remaining} minute(s).")]
    Locked { minutes_remaining: i64 },

    #[error("You've used all {limit} free roasts for today. Upgrade for unlimited roasts.")]
    QuotaExceeded { limit: u32 },

    #[error(transparent)]
    Llm(#[from] LlmError),
}
