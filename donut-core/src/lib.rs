//! # Donut Core
//!
//! Core types for the Fetch-a-Donut chat agent.
//!
//! This crate provides:
//! - Coupon issuance (`coupon`) - one unique code per chat session
//! - Conversation handling (`agent`) - completion call, fallback and reply composition
//! - Message routing (`bus`) - inbound/outbound queues and the dispatch loop
//! - Configuration (`config`) and logging (`logging`)

#![warn(missing_docs)]

pub mod agent;
pub mod bus;
pub mod config;
pub mod coupon;
pub mod error;
pub mod logging;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::agent::message::{Message, Role};
    pub use crate::agent::persona::Persona;
    pub use crate::agent::provider::{ChatRequest, Provider};
    pub use crate::agent::session::{SessionRecord, SessionStatus};
    pub use crate::agent::{AgentRuntime, ConversationHandler, Reply, ReplySource};
    pub use crate::bus::{InboundMessage, MessageBus, OutboundMessage};
    pub use crate::config::AgentConfig;
    pub use crate::coupon::{CouponIssuer, CouponPolicy};
    pub use crate::error::{Error, Result};
}
