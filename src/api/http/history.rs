// src/api/http/history.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiResult, IntoApiError};
use crate::state::AppState;
use crate::transcript::StoredTurn;

const DEFAULT_LIMIT: usize = 30;
const MAX_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryResponse {
    pub identity_id: String,
    pub messages: Vec<StoredTurn>,
}

/// Stored turns for one identity, oldest first.
///
/// The path identity is trusted as given; the auth layer in front of this
/// router must reject requests for any identity other than the caller's.
pub async fn chat_history_handler(
    State(app_state): State<Arc<AppState>>,
    Path(identity_id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> ApiResult<Json<ChatHistoryResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let messages = app_state
        .transcripts
        .recent(&identity_id, limit)
        .await
        .into_api_error("Failed to fetch chat history")?;

    info!("Returning {} transcript turns (limit {})", messages.len(), limit);
    Ok(Json(ChatHistoryResponse {
        identity_id,
        messages,
    }))
}
