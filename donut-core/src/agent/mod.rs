//! Conversation handling: completion requests, persona, replies and dispatch

pub mod handler;
pub mod message;
pub mod persona;
pub mod provider;
pub mod runtime;
pub mod session;
pub mod verdict;

pub use handler::{ConversationHandler, Reply, ReplySource};
pub use runtime::AgentRuntime;
