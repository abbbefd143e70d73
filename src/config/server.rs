// src/config/server.rs
// Server, database, and logging configuration

use serde::Serialize;

use super::helpers::{env_or, env_parsed};
use super::ConfigError;

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// "*" allows any origin
    pub cors_origin: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or("ROAST_HOST", "127.0.0.1"),
            port: env_parsed("ROAST_PORT", 8080)?,
            cors_origin: env_or("ROAST_CORS_ORIGIN", "*"),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or("DATABASE_URL", "sqlite:./roastmate.db"),
            max_connections: env_parsed("ROAST_SQLITE_MAX_CONNECTIONS", 5)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            level: env_or("ROAST_LOG_LEVEL", "info"),
        }
    }
}
