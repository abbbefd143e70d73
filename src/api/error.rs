// src/api/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use std::fmt;
use tracing::error;

use crate::chat::ChatError;
use crate::llm::LlmError;

/// Standard API error response: `{ "error": <message>, "code": <CODE>, ...extra }`
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: &'static str,
    /// Extra top-level fields merged into the body
    pub extra: Map<String, Value>,
}

impl ApiError {
    fn new(status_code: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code,
            extra: Map::new(),
        }
    }

    /// Create a new internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.message,
            "code": self.error_code,
        });

        if let Value::Object(fields) = &mut body {
            fields.extend(self.extra);
        }

        (self.status_code, Json(body)).into_response()
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        let status = match err {
            LlmError::RateLimited => StatusCode::SERVICE_UNAVAILABLE,
            LlmError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            LlmError::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LlmError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            error!("Model call failed: {}", err);
        }
        Self::new(status, err.code(), err.user_message())
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyInput => Self::bad_request(err.to_string()),
            ChatError::Locked { minutes_remaining } => {
                Self::new(StatusCode::LOCKED, "LOCKOUT_ACTIVE", err.to_string())
                    .with_field("minutesRemaining", minutes_remaining)
            }
            ChatError::QuotaExceeded { .. } => {
                Self::new(StatusCode::TOO_MANY_REQUESTS, "LIMIT_EXCEEDED", err.to_string())
                    .with_field("messagesLeft", 0)
            }
            ChatError::Llm(llm) => llm.into(),
        }
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Extension trait for converting storage errors to ApiError
pub trait IntoApiError<T> {
    fn into_api_error(self, message: &str) -> Result<T, ApiError>;
}

impl<T, E> IntoApiError<T> for Result<T, E>
where
    E: std::fmt::Debug,
{
    fn into_api_error(self, message: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            error!("{}: {:?}", message, e);
            ApiError::internal(message)
        })
    }
}

/// Helper function for invalid parameter errors
pub fn invalid_param_error(param_name: &str, reason: &str) -> ApiError {
    ApiError::bad_request(format!("Invalid parameter '{param_name}': {reason}"))
}
