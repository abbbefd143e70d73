// src/api/http/lockout.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::safety::LockoutKey;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockoutStatusResponse {
    pub locked: bool,
    pub minutes_remaining: i64,
}

/// Accepts `identity:<id>`, `session:<id>` or a bare identity id.
///
/// The auth layer must ensure the key belongs to the calling identity or
/// session; this handler does not check.
pub async fn lockout_status_handler(
    State(app_state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<LockoutStatusResponse> {
    let key = if key.starts_with("identity:") || key.starts_with("session:") {
        LockoutKey::new(key)
    } else {
        LockoutKey::new(format!("identity:{key}"))
    };

    let chat = &app_state.chat;
    let status = chat.lockouts().status(&key, chat.clock().now_millis()).await;

    Json(LockoutStatusResponse {
        locked: status.is_locked(),
        minutes_remaining: status.minutes_remaining(),
    })
}
