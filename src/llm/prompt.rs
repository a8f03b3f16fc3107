use super::types::{ChatMessage, Role};

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful research assistant.";

/// Developer instruction, then the literal query followed by the literal
/// grounding text. The text is passed through untruncated.
pub fn build_messages(query: &str, grounding_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: Role::Developer,
            content: SYSTEM_INSTRUCTION.to_string(),
        },
        ChatMessage {
            role: Role::User,
            content: format!("{query}\nAnswer based on the web search results:\n{grounding_text}"),
        },
    ]
}
