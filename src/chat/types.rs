// src/chat/types.rs

use serde::{Deserialize, Serialize};

use crate::persona::{ConversationTurn, PersonaPhase};
use crate::safety::CRISIS_REFERRAL_MESSAGE;

/// Inbound chat request. Identity and privilege come from the auth layer upstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Base64 or data URL
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
    /// Terse replies plus speech
    #[serde(default)]
    pub voice_mode: bool,
    #[serde(default)]
    pub identity_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub is_privileged: bool,
    /// Lockout anchor the client persisted from an earlier crisis reply
    #[serde(default)]
    pub crisis_timestamp: Option<i64>,
}

impl ChatRequest {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_identity(mut self, identity_id: impl Into<String>) -> Self {
        self.identity_id = Some(identity_id.into());
        self
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.conversation_history = history;
        self
    }

    pub fn voice(mut self) -> Self {
        self.voice_mode = true;
        self
    }

    pub fn privileged(mut self) -> Self {
        self.is_privileged = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// None for privileged or anonymous callers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_left: Option<u32>,
    pub turn: u32,
    pub phase: PersonaPhase,
    pub tone_intensity: u8,
    /// Set when the model failed and the fallback line was returned
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrisisReply {
    pub message: String,
    pub crisis: bool,
    /// Epoch millis the lockout was armed at; clients persist this
    pub crisis_timestamp: i64,
}

impl CrisisReply {
    pub fn new(armed_at_ms: i64) -> Self {
        Self {
            message: CRISIS_REFERRAL_MESSAGE.to_string(),
            crisis: true,
            crisis_timestamp: armed_at_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ChatOutcome {
    Reply(ChatReply),
    Crisis(CrisisReply),
}

impl ChatOutcome {
    pub fn is_crisis(&self) -> bool {
        matches!(self, ChatOutcome::Crisis(_))
    }
}
