// src/llm/mod.rs
// External model collaborators: chat completion and speech synthesis

pub mod error;
pub mod speech;
pub mod synthesizer;

pub use error::LlmError;
pub use speech::{should_render_speech, OpenAiSpeechClient, SpeechAudio, SpeechRenderer, SPEECH_MAX_CHARS};
pub use synthesizer::{OpenAiChatClient, ResponseSynthesizer};
