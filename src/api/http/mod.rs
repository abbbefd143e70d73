// src/api/http/mod.rs

mod chat;
mod health;
mod history;
mod lockout;
mod quota;
mod router;

pub use router::{api_router, create_router};
