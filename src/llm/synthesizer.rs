// src/llm/synthesizer.rs
//! Response synthesizer - the chat completion call behind every roast.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, error};

use super::LlmError;
use crate::config::LlmConfig;
use crate::persona::{ConversationTurn, Role};

/// Turns a composed system prompt plus history into reply text.
#[async_trait]
pub trait ResponseSynthesizer: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
        user_turn: &ConversationTurn,
    ) -> Result<String, LlmError>;
}

/// OpenAI-compatible `/chat/completions` client with image understanding
#[derive(Clone)]
pub struct OpenAiChatClient {
    client: Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
    max_output_tokens: u32,
    temperature: f32,
    timeout_secs: u64,
}

impl OpenAiChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Misconfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
        user_turn: &ConversationTurn,
    ) -> Value {
        json!({
            "model": self.model,
            "messages": build_messages(system_prompt, history, user_turn),
            "max_tokens": self.max_output_tokens,
            "temperature": self.temperature,
        })
    }
}

#[async_trait]
impl ResponseSynthesizer for OpenAiChatClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
        user_turn: &ConversationTurn,
    ) -> Result<String, LlmError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("OPENAI_API_KEY is not set; cannot generate replies");
            return Err(LlmError::Misconfigured("OPENAI_API_KEY is not set".into()));
        };

        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(api_key)
            .json(&self.request_body(system_prompt, history, user_turn))
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status, &body, self.timeout_secs));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout_secs))?;
        let text = extract_reply(&raw)?;

        debug!(
            "Completion from {} in {}ms ({} chars)",
            self.model,
            started.elapsed().as_millis(),
            text.chars().count()
        );
        Ok(text)
    }
}

/// System prompt, then text-only history, then the user turn with its image if any.
pub(crate) fn build_messages(
    system_prompt: &str,
    history: &[ConversationTurn],
    user_turn: &ConversationTurn,
) -> Vec<Value> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(json!({ "role": "system", "content": system_prompt }));

    for turn in history {
        // Earlier images are not re-sent; the text is enough for callbacks
        let content = if turn.content.trim().is_empty() && turn.image.is_some() {
            "[sent a photo]".to_string()
        } else {
            turn.content.clone()
        };
        messages.push(json!({ "role": turn.role.as_str(), "content": content }));
    }

    messages.push(user_message(user_turn));
    messages
}

fn user_message(turn: &ConversationTurn) -> Value {
    let Some(image) = turn.image.as_deref() else {
        return json!({ "role": Role::User.as_str(), "content": turn.content });
    };

    let mut parts = Vec::new();
    if !turn.content.trim().is_empty() {
        parts.push(json!({ "type": "text", "text": turn.content }));
    } else {
        parts.push(json!({ "type": "text", "text": "Roast this." }));
    }
    parts.push(json!({
        "type": "image_url",
        "image_url": { "url": image_data_url(image) }
    }));

    json!({ "role": Role::User.as_str(), "content": parts })
}

/// Accepts a data URL, an http(s) URL, or bare base64 (assumed JPEG).
pub fn image_data_url(image: &str) -> String {
    let image = image.trim();
    if image.starts_with("data:") || image.starts_with("http://") || image.starts_with("https://") {
        image.to_string()
    } else {
        format!("data:image/jpeg;base64,{image}")
    }
}

fn extract_reply(raw: &Value) -> Result<String, LlmError> {
    raw["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LlmError::Upstream("completion had no message content".into()))
}
