//! Chat orchestration
//!
//! One request flows: lockout -> safety gate -> quota -> turn/phase ->
//! prompt -> completion -> optional speech -> transcript -> reply.

mod error;
mod service;
mod types;

pub use error::ChatError;
pub use service::{ChatService, FALLBACK_APOLOGY};
pub use types::{ChatOutcome, ChatReply, ChatRequest, CrisisReply};
