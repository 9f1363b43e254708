//! Mock provider for testing

use std::time::Duration;

use async_trait::async_trait;

use crate::{ChatRequest, Error, Provider, Result};

/// A mock provider for testing
pub struct MockProvider {
    outcome: std::result::Result<String, String>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new mock provider with predefined response
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            outcome: Ok(response.into()),
            delay: None,
        }
    }

    /// A provider whose every call fails with a completion error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            delay: None,
        }
    }

    /// Wait `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, _request: ChatRequest) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone().map_err(Error::CompletionApi)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use donut_core::config::AgentConfig;
    use donut_core::prelude::{ConversationHandler, ReplySource};

    use super::*;
    use crate::Message;

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockProvider::new("Hello, world!");
        let text = provider
            .complete(ChatRequest {
                messages: vec![Message::user("Hi")],
                ..Default::default()
            })
            .await
            .expect("should succeed");
        assert_eq!(text, "Hello, world!");
    }

    #[tokio::test]
    async fn test_failing_mock_drives_fallback() {
        let handler = ConversationHandler::new(
            Arc::new(MockProvider::failing("boom")),
            Arc::new(AgentConfig::default()),
        );
        let reply = handler.handle_message("abc123", "glazed").await.unwrap();
        assert_eq!(reply.source, ReplySource::Fallback);
        assert!(reply.text.contains(&reply.coupon_code));
    }

    #[tokio::test]
    async fn test_slow_mock_times_out() {
        let mut config = AgentConfig::default();
        config.completion.timeout_secs = 1;
        let provider = MockProvider::new("late").with_delay(Duration::from_secs(5));
        let handler = ConversationHandler::new(Arc::new(provider), Arc::new(config));

        let reply = handler.handle_message("xyz999", "maple bacon").await.unwrap();
        assert_eq!(reply.source, ReplySource::Fallback);
        assert!(reply.text.starts_with("Sorry, having trouble right now!"));
    }
}
