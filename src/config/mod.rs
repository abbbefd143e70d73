// src/config/mod.rs
// Central configuration - composed from per-domain configs, all read from env

pub mod helpers;
pub mod llm;
pub mod server;

use serde::Serialize;
use thiserror::Error;

pub use llm::{LlmConfig, SpeechConfig};
pub use server::{DatabaseConfig, LoggingConfig, ServerConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {key}='{value}': {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub speech: SpeechConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Don't fail if .env doesn't exist (production uses real env)
        dotenvy::dotenv().ok();

        let llm = LlmConfig::from_env()?;
        let speech = SpeechConfig::from_env(&llm)?;

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            llm,
            speech,
            logging: LoggingConfig::from_env(),
        })
    }

    pub fn bind_address(&self) -> String {
        self.server.bind_address()
    }
}
