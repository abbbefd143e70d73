// src/api/http/health.rs

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::state::AppState;

/// Health check handler
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": app_state.model,
        "speech": app_state.speech_enabled,
        "timestamp": Utc::now().to_rfc3339()
    }))
}
