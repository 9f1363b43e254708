//! Agent configuration
//!
//! Configuration is resolved once at startup, in priority order:
//! 1. Environment variables (`DONUT_` prefix, plus `ASI_ONE_API_KEY`)
//! 2. YAML config file (optional)
//! 3. Defaults
//!
//! The resulting [`AgentConfig`] is shared behind an `Arc` and never mutated.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::persona::PersonaKind;
use crate::coupon::MIN_SUFFIX_LEN;
use crate::error::{Error, Result};

/// Placeholder for the completion reply in the reply template
pub const REPLY_PLACEHOLDER: &str = "{reply}";
/// Placeholder for the coupon code in the reply template
pub const COUPON_PLACEHOLDER: &str = "{coupon}";
/// Placeholder for the event name in the reply template
pub const EVENT_PLACEHOLDER: &str = "{event}";
/// Placeholder for the event dates in the reply template
pub const DATES_PLACEHOLDER: &str = "{dates}";

/// Top-level agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Name of the agent (for logging/identity)
    pub name: String,
    /// System prompt used for completions
    pub persona: PersonaKind,
    /// Event the coupons are redeemable at
    pub event: EventConfig,
    /// Coupon code policy
    pub coupon: CouponConfig,
    /// Completion API settings
    pub completion: CompletionConfig,
    /// Reply texts
    pub reply: ReplyConfig,
    /// Log output
    pub logging: LoggingConfig,
    /// Capacity of the inbound and outbound message queues
    pub bus_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "fetch-a-donut".to_string(),
            persona: PersonaKind::default(),
            event: EventConfig::default(),
            coupon: CouponConfig::default(),
            completion: CompletionConfig::default(),
            reply: ReplyConfig::default(),
            logging: LoggingConfig::default(),
            bus_capacity: 100,
        }
    }
}

/// Event details shown in replies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Display name of the event
    pub name: String,
    /// First day of the event
    pub start_date: Option<String>,
    /// Last day of the event
    pub end_date: Option<String>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            name: "the conference".to_string(),
            start_date: None,
            end_date: None,
        }
    }
}

impl EventConfig {
    /// Human readable date range, empty when no dates are configured
    pub fn dates(&self) -> String {
        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => format!("{} - {}", start, end),
            (Some(day), None) | (None, Some(day)) => day.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Coupon code policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CouponConfig {
    /// Leading part of every code (e.g. "DONUT")
    pub prefix: String,
    /// Optional event identifier placed between prefix and suffix
    pub event_id: Option<String>,
    /// Length of the random `A-Z0-9` suffix
    pub suffix_len: usize,
}

impl Default for CouponConfig {
    fn default() -> Self {
        Self {
            prefix: "DONUT".to_string(),
            event_id: None,
            suffix_len: 5,
        }
    }
}

/// Completion API settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// API key; usually supplied through the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Max tokens to generate
    pub max_tokens: Option<u64>,
    /// Temperature for generation
    pub temperature: Option<f64>,
    /// Upper bound for a single completion round trip
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.asi1.ai/v1".to_string(),
            model: "asi1".to_string(),
            api_key: None,
            max_tokens: Some(256),
            temperature: None,
            timeout_secs: 30,
        }
    }
}

impl CompletionConfig {
    /// Completion timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Reply texts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Template for every reply. Supports `{reply}`, `{coupon}`, `{event}` and `{dates}`.
    pub template: String,
    /// Used in place of the model's reply when the completion call fails
    pub fallback: String,
    /// Used in place of the model's reply when the user sent no text
    pub welcome: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            template: "{reply} Here's your ticket: {coupon}".to_string(),
            fallback: "Sorry, having trouble right now!".to_string(),
            welcome: "Welcome to Fetch-a-Donut! I'm your friendly donut fairy! \
                      Tell me about your favorite donut, your dream donut combination \
                      or a time a donut saved your day."
                .to_string(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for rotated log files
    pub directory: String,
    /// Log file name prefix
    pub file_prefix: String,
    /// Default level filter, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            file_prefix: "donut-agent.log".to_string(),
            level: "info".to_string(),
        }
    }
}

impl AgentConfig {
    /// Load configuration: defaults, then the optional YAML file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML config file. Missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    /// Parse YAML configuration
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml_ng::from_str(raw)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DONUT_AGENT_NAME") {
            self.name = v;
        }
        if let Some(v) = lookup("DONUT_PERSONA") {
            self.persona = v.parse()?;
        }
        if let Some(v) = lookup("DONUT_EVENT_NAME") {
            self.event.name = v;
        }
        if let Some(v) = lookup("DONUT_EVENT_START_DATE") {
            self.event.start_date = Some(v);
        }
        if let Some(v) = lookup("DONUT_EVENT_END_DATE") {
            self.event.end_date = Some(v);
        }
        if let Some(v) = lookup("DONUT_COUPON_PREFIX") {
            self.coupon.prefix = v;
        }
        if let Some(v) = lookup("DONUT_EVENT_ID") {
            self.coupon.event_id = Some(v).filter(|id| !id.is_empty());
        }
        if let Some(v) = lookup("DONUT_REPLY_TEMPLATE") {
            self.reply.template = v;
        }
        if let Some(v) = lookup("DONUT_COMPLETION_BASE_URL") {
            self.completion.base_url = v;
        }
        if let Some(v) = lookup("DONUT_COMPLETION_MODEL") {
            self.completion.model = v;
        }
        if let Some(v) = lookup("DONUT_COMPLETION_TIMEOUT_SECS") {
            self.completion.timeout_secs = v.parse().map_err(|_| {
                Error::config(format!("DONUT_COMPLETION_TIMEOUT_SECS is not a number: {}", v))
            })?;
        }
        if let Some(v) = lookup("ASI_ONE_API_KEY") {
            self.completion.api_key = Some(v);
        }
        if let Some(v) = lookup("DONUT_LOG_DIR") {
            self.logging.directory = v;
        }
        if let Some(v) = lookup("DONUT_LOG_LEVEL") {
            self.logging.level = v;
        }
        Ok(())
    }

    /// Reject configurations the agent cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.coupon.prefix.trim().is_empty() {
            return Err(Error::config("coupon prefix must not be empty"));
        }
        if self.coupon.suffix_len < MIN_SUFFIX_LEN {
            return Err(Error::config(format!(
                "coupon suffix length must be at least {}",
                MIN_SUFFIX_LEN
            )));
        }
        if self.completion.timeout_secs == 0 {
            return Err(Error::config("completion timeout must be at least 1 second"));
        }
        if !self.reply.template.contains(COUPON_PLACEHOLDER) {
            return Err(Error::config(format!(
                "reply template must contain {}",
                COUPON_PLACEHOLDER
            )));
        }
        if self.bus_capacity == 0 {
            return Err(Error::config("bus capacity must be at least 1"));
        }
        Ok(())
    }
}
