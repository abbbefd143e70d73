// src/api/http/chat.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::chat::{ChatOutcome, ChatRequest};
use crate::state::AppState;

pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatOutcome>> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    info!(
        "Chat request: {} chars, image: {}, history: {}, voice: {}, identified: {}",
        request.message.as_deref().map_or(0, |m| m.chars().count()),
        request.image.is_some(),
        request.conversation_history.len(),
        request.voice_mode,
        request.identity_id.is_some()
    );

    let outcome = app_state.chat.handle(request).await?;
    Ok(Json(outcome))
}
