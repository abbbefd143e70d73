// src/api/http/router.rs
// HTTP router composition for REST API endpoints

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::warn;

use super::{
    chat::chat_handler,
    health::health_handler,
    history::chat_history_handler,
    lockout::lockout_status_handler,
    quota::quota_handler,
};
use crate::state::AppState;

/// Routes served under /api
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/chat/history/{identity_id}", get(chat_history_handler))
        .route("/quota/{identity_id}", get(quota_handler))
        .route("/lockout/{key}", get(lockout_status_handler))
}

/// Full application router with CORS, tracing and version header
pub fn create_router(app_state: Arc<AppState>, cors_origin: &str) -> Router {
    Router::new()
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-api-version"),
            HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
        ))
        .with_state(app_state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origin == "*" {
        return layer.allow_origin(Any);
    }

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid ROAST_CORS_ORIGIN '{}', allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}
