//! Per-session coupon state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coupon status of a chat session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No message handled yet, no coupon assigned
    New,
    /// A coupon has been assigned; terminal
    Ticketed,
}

/// A coupon bound to a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    /// The coupon code
    pub code: String,
    /// When the code was minted
    pub issued_at: DateTime<Utc>,
}

impl Ticket {
    /// Create a ticket issued now
    pub fn new(code: String) -> Self {
        Self {
            code,
            issued_at: Utc::now(),
        }
    }
}

/// Snapshot of a session's coupon state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    /// Session identifier from the transport
    pub session_id: String,
    /// Coupon, once issued
    pub ticket: Option<Ticket>,
}

impl SessionRecord {
    /// Current status derived from the ticket
    pub fn status(&self) -> SessionStatus {
        match self.ticket {
            Some(_) => SessionStatus::Ticketed,
            None => SessionStatus::New,
        }
    }

    /// Coupon code, once issued
    pub fn coupon_code(&self) -> Option<&str> {
        self.ticket.as_ref().map(|t| t.code.as_str())
    }
}
