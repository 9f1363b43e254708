//! Provider trait for completion APIs

use async_trait::async_trait;

use crate::agent::message::Message;
use crate::error::Result;

/// Request for a chat completion
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Model name to use
    pub model: String,
    /// Optional system prompt
    pub system_prompt: Option<String>,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Optional temperature setting
    pub temperature: Option<f64>,
    /// Optional max tokens
    pub max_tokens: Option<u64>,
}

/// Trait for completion API providers
///
/// Implement this trait to add support for a new hosted model. A single call
/// is one attempt; callers apply their own timeout.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Run a completion request and return the generated text
    async fn complete(&self, request: ChatRequest) -> Result<String>;

    /// Get provider name (for logging/debugging)
    fn name(&self) -> &'static str;
}
