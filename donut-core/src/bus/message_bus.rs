//! Inbound/outbound chat messages and the queues that carry them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::coupon::validate_session_id;
use crate::error::{Error, Result};

/// Inbound chat message from the transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Message identifier, echoed in the acknowledgement
    pub msg_id: Uuid,
    /// Conversation identifier
    pub session_id: String,
    /// Message text
    pub text: String,
    /// Message timestamp
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    /// Create a new inbound message
    pub fn new(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            msg_id: Uuid::new_v4(),
            session_id: session_id.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Boundary check before the message reaches the handler
    pub fn validate(&self) -> Result<()> {
        validate_session_id(&self.session_id)
    }
}

/// Outbound message to the transport
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Receipt for an inbound message
    Acknowledgement {
        /// Target session
        session_id: String,
        /// The inbound message being acknowledged
        acknowledged_msg_id: Uuid,
        /// Acknowledgement timestamp
        timestamp: DateTime<Utc>,
    },
    /// Text reply
    Chat {
        /// Message identifier
        msg_id: Uuid,
        /// Target session
        session_id: String,
        /// Reply text
        text: String,
        /// Tells the transport the conversation is complete
        end_session: bool,
        /// Reply timestamp
        timestamp: DateTime<Utc>,
    },
}

impl OutboundMessage {
    /// Acknowledge an inbound message
    pub fn ack(inbound: &InboundMessage) -> Self {
        Self::Acknowledgement {
            session_id: inbound.session_id.clone(),
            acknowledged_msg_id: inbound.msg_id,
            timestamp: Utc::now(),
        }
    }

    /// Create a chat reply
    pub fn chat(session_id: impl Into<String>, text: impl Into<String>, end_session: bool) -> Self {
        Self::Chat {
            msg_id: Uuid::new_v4(),
            session_id: session_id.into(),
            text: text.into(),
            end_session,
            timestamp: Utc::now(),
        }
    }

    /// Reply text, if this is a chat message
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Chat { text, .. } => Some(text),
            Self::Acknowledgement { .. } => None,
        }
    }
}

/// Message Bus - routing between the transport and the agent
///
/// ```text
/// Transport ──▶ InboundQueue ──▶ Agent ──▶ OutboundQueue ──▶ Transport
/// ```
///
/// # Example
///
/// ```ignore
/// let bus = MessageBus::new(100);
///
/// bus.publish_inbound(InboundMessage::new("abc123", "chocolate glazed")).await?;
/// let msg = bus.consume_inbound().await?;
///
/// bus.publish_outbound(OutboundMessage::chat("abc123", "Here's your ticket", true)).await?;
/// let reply = bus.consume_outbound().await?;
/// ```
pub struct MessageBus {
    inbound_tx: mpsc::Sender<InboundMessage>,
    inbound_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>>,
    outbound_tx: mpsc::Sender<OutboundMessage>,
    outbound_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<OutboundMessage>>>,
}

impl MessageBus {
    /// Create a new message bus with specified buffer size
    pub fn new(buffer_size: usize) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(buffer_size);
        let (outbound_tx, outbound_rx) = mpsc::channel(buffer_size);

        Self {
            inbound_tx,
            inbound_rx: Arc::new(tokio::sync::Mutex::new(inbound_rx)),
            outbound_tx,
            outbound_rx: Arc::new(tokio::sync::Mutex::new(outbound_rx)),
        }
    }

    /// Publish an inbound message (transport to agent)
    pub async fn publish_inbound(&self, message: InboundMessage) -> Result<()> {
        self.inbound_tx
            .send(message)
            .await
            .map_err(|e| Error::Internal(format!("Failed to publish inbound message: {}", e)))
    }

    /// Consume an inbound message (agent reads from transport)
    pub async fn consume_inbound(&self) -> Result<InboundMessage> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| Error::Internal("Inbound channel closed".to_string()))
    }

    /// Publish an outbound message (agent to transport)
    pub async fn publish_outbound(&self, message: OutboundMessage) -> Result<()> {
        self.outbound_tx
            .send(message)
            .await
            .map_err(|e| Error::Internal(format!("Failed to publish outbound message: {}", e)))
    }

    /// Consume an outbound message (transport reads agent responses)
    pub async fn consume_outbound(&self) -> Result<OutboundMessage> {
        let mut rx = self.outbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| Error::Internal("Outbound channel closed".to_string()))
    }

    /// Take an outbound message if one is queued, without waiting
    pub async fn try_consume_outbound(&self) -> Option<OutboundMessage> {
        let mut rx = self.outbound_rx.lock().await;
        rx.try_recv().ok()
    }
}

impl Clone for MessageBus {
    fn clone(&self) -> Self {
        Self {
            inbound_tx: self.inbound_tx.clone(),
            inbound_rx: Arc::clone(&self.inbound_rx),
            outbound_tx: self.outbound_tx.clone(),
            outbound_rx: Arc::clone(&self.outbound_rx),
        }
    }
}
