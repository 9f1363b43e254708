//! ASI:One provider (OpenAI compatible)

use async_trait::async_trait;
use donut_core::config::CompletionConfig;

use crate::openai::OpenAI;
use crate::{ChatRequest, Error, HttpConfig, Provider, Result};

/// Default ASI:One endpoint
pub const ASI_ONE_BASE_URL: &str = "https://api.asi1.ai/v1";

/// ASI:One API client
pub struct AsiOne {
    inner: OpenAI,
}

impl AsiOne {
    /// Create from API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let inner = OpenAI::with_base_url(api_key, ASI_ONE_BASE_URL)?;
        Ok(Self { inner })
    }

    /// Create from the agent's completion settings.
    ///
    /// The HTTP client timeout matches the completion timeout.
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::ProviderAuth("ASI_ONE_API_KEY not set".to_string()))?;
        let http = HttpConfig::with_timeout(config.timeout_secs);
        let inner = OpenAI::with_http_config(api_key, config.base_url.as_str(), &http)?;
        Ok(Self { inner })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}

#[async_trait]
impl Provider for AsiOne {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        self.inner.complete(request).await
    }

    fn name(&self) -> &'static str {
        "asi-one"
    }
}
