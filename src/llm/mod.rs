//! Completion-service seam.
//!
//! The chat workflow talks to a hosted chat-completion API through the
//! `CompletionProvider` trait; `OpenAiProvider` is the HTTP implementation.

pub mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;

use crate::chat::ChatMessage;
use crate::error::LlmError;

/// One-round-trip completion provider. The full transcript goes out; one
/// assistant message comes back.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Model identifier sent with each request.
    fn model_name(&self) -> &str;

    /// Complete the conversation. Single attempt, no retry.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatMessage, LlmError>;
}
