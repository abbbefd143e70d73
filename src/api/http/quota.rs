// src/api/http/quota.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::error::{invalid_param_error, ApiResult, IntoApiError};
use crate::quota::QuotaSnapshot;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct QuotaQuery {
    #[serde(default)]
    pub privileged: bool,
}

/// Read-only view of today's usage; never consumes a message.
///
/// No caller check happens here. The auth layer in front of this router must
/// only let a caller read the identity it authenticated as.
pub async fn quota_handler(
    State(app_state): State<Arc<AppState>>,
    Path(identity_id): Path<String>,
    Query(params): Query<QuotaQuery>,
) -> ApiResult<Json<QuotaSnapshot>> {
    if identity_id.trim().is_empty() {
        return Err(invalid_param_error("identity_id", "must not be blank"));
    }

    let chat = &app_state.chat;
    let snapshot = chat
        .quota()
        .snapshot(&identity_id, params.privileged, chat.clock().today())
        .await
        .into_api_error("Failed to read quota")?;

    Ok(Json(snapshot))
}
