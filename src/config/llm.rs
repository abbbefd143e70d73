// src/config/llm.rs
// Completion and text-to-speech provider configuration

use serde::Serialize;

use super::helpers::{env_bool, env_opt, env_or, env_parsed};
use super::ConfigError;

/// Chat completion provider (OpenAI-compatible)
#[derive(Debug, Clone, Serialize)]
pub struct LlmConfig {
    /// Missing key is not a startup error; chat requests fail as misconfigured
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_opt("OPENAI_API_KEY"),
            base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            model: env_or("ROAST_CHAT_MODEL", "gpt-4o-mini"),
            max_output_tokens: env_parsed("ROAST_MAX_OUTPUT_TOKENS", 400)?,
            temperature: env_parsed("ROAST_TEMPERATURE", 0.9)?,
            timeout_secs: env_parsed("LLM_TIMEOUT_SECS", 40)?,
        })
    }
}

/// Text-to-speech provider (OpenAI-compatible `/audio/speech`)
#[derive(Debug, Clone, Serialize)]
pub struct SpeechConfig {
    pub enabled: bool,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub voice: String,
    pub timeout_secs: u64,
}

impl SpeechConfig {
    /// Key and base URL fall back to the completion provider's.
    pub fn from_env(llm: &LlmConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            enabled: env_bool("TTS_ENABLED", true)?,
            api_key: env_opt("TTS_API_KEY").or_else(|| llm.api_key.clone()),
            base_url: env_opt("TTS_API_URL").unwrap_or_else(|| llm.base_url.clone()),
            model: env_or("TTS_MODEL", "tts-1"),
            voice: env_or("TTS_VOICE", "onyx"),
            timeout_secs: env_parsed("TTS_TIMEOUT_SECS", 30)?,
        })
    }
}
