// src/state.rs

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    chat::ChatService,
    config::AppConfig,
    llm::{OpenAiChatClient, OpenAiSpeechClient},
    quota::SqliteQuotaStore,
    transcript::TranscriptStore,
};

#[derive(Clone)]
pub struct AppState {
    // -------- Storage --------
    pub db: SqlitePool,
    pub transcripts: TranscriptStore,

    // -------- Services --------
    pub chat: Arc<ChatService>,

    // -------- Reported by /health --------
    pub model: String,
    pub speech_enabled: bool,
}

impl AppState {
    /// Wires the production clients from config
    pub fn build(config: &AppConfig, db: SqlitePool) -> Result<Self> {
        let synthesizer = OpenAiChatClient::new(&config.llm)?;
        if config.llm.api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; chat requests will fail with MISCONFIGURED");
        }

        let transcripts = TranscriptStore::new(db.clone());
        let mut chat = ChatService::new(
            Arc::new(synthesizer),
            Arc::new(SqliteQuotaStore::new(db.clone())),
        )
        .with_transcripts(transcripts.clone())
        .with_llm_timeout(Duration::from_secs(config.llm.timeout_secs));

        let speech = OpenAiSpeechClient::from_config(&config.speech)?;
        let speech_enabled = speech.is_some();
        if let Some(speech) = speech {
            chat = chat.with_speech(Arc::new(speech));
        }

        info!(
            "Chat service ready (model: {}, speech: {})",
            config.llm.model, speech_enabled
        );

        Ok(Self::new(db, transcripts, chat, config.llm.model.clone(), speech_enabled))
    }

    pub fn new(
        db: SqlitePool,
        transcripts: TranscriptStore,
        chat: ChatService,
        model: String,
        speech_enabled: bool,
    ) -> Self {
        Self {
            db,
            transcripts,
            chat: Arc::new(chat),
            model,
            speech_enabled,
        }
    }
}
