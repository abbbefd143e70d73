// src/llm/error.rs

use reqwest::StatusCode;
use thiserror::Error;

/// Failure categories surfaced to users. Every provider error lands in one of these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("The model provider is rate limiting requests")]
    RateLimited,

    #[error("Model provider is misconfigured: {0}")]
    Misconfigured(String),

    #[error("Model provider did not answer within {0}s")]
    Timeout(u64),

    #[error("Model provider error: {0}")]
    Upstream(String),
}

impl LlmError {
    /// Classify a non-success HTTP status from the provider
    pub fn from_status(status: StatusCode, body: &str, timeout_secs: u64) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                LlmError::Misconfigured(format!("provider rejected credentials ({status})"))
            }
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => LlmError::Timeout(timeout_secs),
            _ => LlmError::Upstream(format!("{status}: {}", truncate(body, 300))),
        }
    }

    /// Classify a transport-level failure
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout_secs)
        } else if let Some(status) = err.status() {
            Self::from_status(status, "", timeout_secs)
        } else {
            LlmError::Upstream(err.to_string())
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            LlmError::RateLimited => "RATE_LIMITED",
            LlmError::Misconfigured(_) => "MISCONFIGURED",
            LlmError::Timeout(_) => "TIMEOUT",
            LlmError::Upstream(_) => "UPSTREAM_ERROR",
        }
    }

    /// Message safe to show a user. Never includes provider response bodies.
    pub fn user_message(&self) -> &'static str {
        match self {
            LlmError::RateLimited => "Too many people are getting roasted right now. Try again in a minute.",
            LlmError::Misconfigured(_) => "The roast service is not configured correctly.",
            LlmError::Timeout(_) => "That took too long to come up with. Try again.",
            LlmError::Upstream(_) => "Something went wrong. Try again.",
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            LlmError::from_status(StatusCode::UNAUTHORIZED, "bad key", 40),
            LlmError::Misconfigured(_)
        ));
        assert!(matches!(
            LlmError::from_status(StatusCode::FORBIDDEN, "", 40),
            LlmError::Misconfigured(_)
        ));
        assert_eq!(
            LlmError::from_status(StatusCode::TOO_MANY_REQUESTS, "", 40),
            LlmError::RateLimited
        );
        assert_eq!(
            LlmError::from_status(StatusCode::GATEWAY_TIMEOUT, "", 40),
            LlmError::Timeout(40)
        );
        assert!(matches!(
            LlmError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom", 40),
            LlmError::Upstream(_)
        ));
    }

    #[test]
    fn test_upstream_body_is_truncated() {
        let body = "x".repeat(1000);
        let LlmError::Upstream(detail) = LlmError::from_status(StatusCode::BAD_GATEWAY, &body, 40) else {
            panic!("expected upstream");
        };
        assert!(detail.len() < 400);
        assert!(detail.ends_with("..."));
    }

    #[test]
    fn test_user_message_hides_detail() {
        let err = LlmError::Upstream("secret provider stack trace".into());
        assert!(!err.user_message().contains("secret"));
        assert_eq!(err.code(), "UPSTREAM_ERROR");
    }
}
