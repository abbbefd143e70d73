// src/prompt/mod.rs
// System prompt assembly for the persona

pub mod builder;

pub use builder::{
    compose_system_prompt, OperatingMode, NEGATIVE_CONSTRAINT, VOICE_LENGTH_CONSTRAINT,
};
