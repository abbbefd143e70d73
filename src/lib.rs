// src/lib.rs

pub mod api;
pub mod chat;
pub mod clock;
pub mod config;
pub mod db;
pub mod llm;
pub mod persona;
pub mod prompt;
pub mod quota;
pub mod safety;
pub mod state;
pub mod transcript;

pub use state::AppState;
