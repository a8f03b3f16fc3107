//! Synthesizer: one chat-completion request grounding an answer in page text.

pub mod client;
pub mod prompt;
pub mod types;

pub use client::{CompletionClient, GenerationError, OpenAiClient};
