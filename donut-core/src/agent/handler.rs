//! Conversation handler - one call per inbound chat message

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::agent::message::Message;
use crate::agent::persona::Persona;
use crate::agent::provider::{ChatRequest, Provider};
use crate::agent::session::SessionStatus;
use crate::agent::verdict::interpret_reply;
use crate::config::{
    AgentConfig, COUPON_PLACEHOLDER, DATES_PLACEHOLDER, EVENT_PLACEHOLDER, REPLY_PLACEHOLDER,
};
use crate::coupon::{validate_session_id, CouponIssuer, CouponPolicy};
use crate::error::{Error, Result};

/// Where the playful part of a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    /// Generated by the completion API
    Completion,
    /// Completion failed; configured fallback text
    Fallback,
    /// User sent no text; configured welcome text
    Welcome,
}

/// Reply to a single chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Final text sent back to the user
    pub text: String,
    /// The session's coupon
    pub coupon_code: String,
    /// Origin of the playful text
    pub source: ReplySource,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Handles chat messages: asks the model for a playful answer and attaches the
/// session's coupon.
///
/// The handler owns the session-to-coupon state. It is `Send + Sync` and meant
/// to be shared behind an `Arc` by whatever schedules inbound messages.
pub struct ConversationHandler {
    provider: Arc<dyn Provider>,
    issuer: CouponIssuer,
    persona: Persona,
    config: Arc<AgentConfig>,
}

impl ConversationHandler {
    /// Create a handler with a fresh coupon issuer built from `config`.
    ///
    /// The system persona is the one named by `config.persona`.
    pub fn new(provider: Arc<dyn Provider>, config: Arc<AgentConfig>) -> Self {
        let issuer = CouponIssuer::new(CouponPolicy::from(&config.coupon));
        Self::with_issuer(provider, issuer, config)
    }

    /// Create a handler around an existing issuer
    pub fn with_issuer(
        provider: Arc<dyn Provider>,
        issuer: CouponIssuer,
        config: Arc<AgentConfig>,
    ) -> Self {
        Self {
            provider,
            issuer,
            persona: config.persona.persona(),
            config,
        }
    }

    /// Handle one chat message.
    ///
    /// Completion failures never surface here: the fallback text is used and
    /// the coupon is still issued. The only error is an invalid session id.
    #[instrument(skip(self, user_text), fields(provider = self.provider.name(), text_len = user_text.len()))]
    pub async fn handle_message(&self, session_id: &str, user_text: &str) -> Result<Reply> {
        validate_session_id(session_id)?;

        let user_text = user_text.trim();
        let (playful, source) = if user_text.is_empty() {
            (self.config.reply.welcome.clone(), ReplySource::Welcome)
        } else {
            match self.complete(user_text).await {
                Ok(text) => (text, ReplySource::Completion),
                Err(e) => {
                    if e.is_completion_failure() {
                        warn!(error = %e, "Completion failed, using fallback reply");
                    } else {
                        error!(error = %e, "Unexpected error during completion, using fallback reply");
                    }
                    (self.config.reply.fallback.clone(), ReplySource::Fallback)
                }
            }
        };

        let coupon_code = self.issuer.issue_or_get(session_id)?;
        debug!(?source, "Reply composed");

        Ok(Reply {
            text: self.render(&playful, &coupon_code),
            coupon_code,
            source,
        })
    }

    /// Coupon status of a session
    pub fn session_status(&self, session_id: &str) -> SessionStatus {
        self.issuer.status(session_id)
    }

    /// The coupon issuer
    pub fn issuer(&self) -> &CouponIssuer {
        &self.issuer
    }

    /// The system persona sent with every completion
    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    async fn complete(&self, user_text: &str) -> Result<String> {
        let completion = &self.config.completion;
        let request = ChatRequest {
            model: completion.model.clone(),
            system_prompt: Some(self.persona.to_prompt()),
            messages: vec![Message::user(user_text)],
            temperature: completion.temperature,
            max_tokens: completion.max_tokens,
        };

        let raw = tokio::time::timeout(completion.timeout(), self.provider.complete(request))
            .await
            .map_err(|_| Error::CompletionTimeout {
                timeout_secs: completion.timeout_secs,
            })??;

        interpret_reply(&raw)
    }

    // The model's text goes in last so placeholders inside it stay literal.
    fn render(&self, playful: &str, coupon_code: &str) -> String {
        self.config
            .reply
            .template
            .replace(COUPON_PLACEHOLDER, coupon_code)
            .replace(EVENT_PLACEHOLDER, &self.config.event.name)
            .replace(DATES_PLACEHOLDER, &self.config.event.dates())
            .replace(REPLY_PLACEHOLDER, playful)
    }
}
