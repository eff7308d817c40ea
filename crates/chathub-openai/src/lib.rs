//! OpenAI-style request and response shapes for the ChatHub client.
//!
//! Parses chat-completion message lists into the prompt, context and image
//! of one turn, and renders turn events as completion chunks.

pub mod messages;
pub mod response;

pub use messages::{
    parse_messages, ContentPart, ImageUrl, MessageContent, OpenAiMessage, ParsedMessages,
};
pub use response::{
    ChatCompletion, ChatCompletionChunk, CompletionCollector, FinishReason, ImageGeneration,
};

/// Errors at the OpenAI compatibility boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpenAiError {
    #[error("user prompt is missing (last message is not sent by user)")]
    MissingPrompt,
}
