//! Message routing between the chat transport and the agent

pub mod message_bus;

pub use message_bus::{InboundMessage, MessageBus, OutboundMessage};
