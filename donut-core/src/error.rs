//! Error types for the donut agent

use thiserror::Error;

/// Result type alias using donut-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the donut agent
#[derive(Debug, Error)]
pub enum Error {
    // ============ Session Errors ============
    /// Session identifier is empty or malformed
    #[error("Invalid session identifier: {0:?}")]
    InvalidSession(String),

    // ============ Completion Errors ============
    /// Completion API returned an error or an unusable response
    #[error("Completion API error: {0}")]
    CompletionApi(String),

    /// Completion API did not answer in time
    #[error("Completion API timeout after {timeout_secs}s")]
    CompletionTimeout {
        /// Timeout duration in seconds
        timeout_secs: u64,
    },

    /// Completion API credentials missing or rejected
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    // ============ Configuration Errors ============
    /// Configuration is invalid or could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    // ============ Network Errors ============
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ============ Serialization Errors ============
    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ============ System Errors ============
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============ Generic Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a new invalid session error
    pub fn invalid_session(session_id: impl Into<String>) -> Self {
        Self::InvalidSession(session_id.into())
    }

    /// Create a new completion API error
    pub fn completion(msg: impl Into<String>) -> Self {
        Self::CompletionApi(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error came from the completion round trip.
    ///
    /// These are recovered locally with the fallback reply.
    pub fn is_completion_failure(&self) -> bool {
        matches!(
            self,
            Self::CompletionApi(_)
                | Self::CompletionTimeout { .. }
                | Self::ProviderAuth(_)
                | Self::Http(_)
                | Self::Serialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_failure_classification() {
        assert!(Error::completion("bad gateway").is_completion_failure());
        assert!(Error::CompletionTimeout { timeout_secs: 3 }.is_completion_failure());
        assert!(!Error::invalid_session("").is_completion_failure());
        assert!(!Error::config("missing prefix").is_completion_failure());
    }

    #[test]
    fn test_display() {
        let err = Error::CompletionTimeout { timeout_secs: 30 };
        assert_eq!(err.to_string(), "Completion API timeout after 30s");
    }
}
