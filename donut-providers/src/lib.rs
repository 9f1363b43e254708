//! # Donut Providers
//!
//! Completion API clients for the donut agent.

#![warn(missing_docs)]

// Re-export core types for convenience
pub use donut_core::agent::message::{Message, Role};
pub use donut_core::agent::provider::{ChatRequest, Provider};
pub use donut_core::error::{Error, Result};

pub mod mock;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "asi-one")]
pub mod asi_one;

mod provider_tests;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connection pool idle timeout
    pub pool_idle_timeout_secs: u64,
    /// Max idle connections per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            pool_idle_timeout_secs: 90,
            pool_max_idle_per_host: 8,
        }
    }
}

impl HttpConfig {
    /// Default pool settings with the given request timeout
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            timeout_secs,
            ..Self::default()
        }
    }

    /// Build a reqwest client
    pub fn build_client(&self) -> Result<reqwest::Client> {
        use std::time::Duration;

        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(self.pool_idle_timeout_secs))
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .build()
            .map_err(|e| Error::Internal(e.to_string()))
    }
}
