// src/llm/speech.rs
//! Speech renderer - turns a reply into audio for voice mode.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::LlmError;
use crate::config::SpeechConfig;

/// Replies longer than this are never sent to TTS
pub const SPEECH_MAX_CHARS: usize = 600;

/// Length guard applied by the caller before invoking a renderer
pub fn should_render_speech(text: &str) -> bool {
    !text.trim().is_empty() && text.chars().count() <= SPEECH_MAX_CHARS
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl SpeechAudio {
    /// Inline `data:` URL; nothing is uploaded anywhere
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

#[async_trait]
pub trait SpeechRenderer: Send + Sync {
    async fn speak(&self, text: &str) -> Result<SpeechAudio, LlmError>;
}

/// OpenAI-compatible TTS (`POST {base}/audio/speech`)
#[derive(Debug, Clone)]
pub struct OpenAiSpeechClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    voice: String,
    timeout_secs: u64,
}

impl OpenAiSpeechClient {
    /// `Ok(None)` when speech is disabled or no key is available.
    pub fn from_config(config: &SpeechConfig) -> Result<Option<Self>, LlmError> {
        if !config.enabled {
            info!("Speech synthesis disabled (TTS_ENABLED=false)");
            return Ok(None);
        }
        let Some(api_key) = config.api_key.clone() else {
            info!("Speech synthesis disabled (no TTS_API_KEY or OPENAI_API_KEY)");
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Misconfigured(format!("TTS HTTP client: {e}")))?;

        Ok(Some(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            voice: config.voice.clone(),
            timeout_secs: config.timeout_secs,
        }))
    }
}

#[async_trait]
impl SpeechRenderer for OpenAiSpeechClient {
    async fn speak(&self, text: &str) -> Result<SpeechAudio, LlmError> {
        let url = format!("{}/audio/speech", self.base_url);
        let body = json!({
            "model": self.model,
            "voice": self.voice,
            "input": text,
            "response_format": "mp3",
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status, &body, self.timeout_secs));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout_secs))?;
        if bytes.is_empty() {
            return Err(LlmError::Upstream("TTS returned no audio".into()));
        }

        debug!("TTS produced {} bytes for {} chars", bytes.len(), text.chars().count());
        Ok(SpeechAudio {
            bytes: bytes.to_vec(),
            mime_type: "audio/mpeg",
        })
    }
}
