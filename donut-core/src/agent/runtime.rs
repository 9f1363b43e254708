//! Dispatch loop between the message bus and the conversation handler

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::agent::handler::ConversationHandler;
use crate::bus::{InboundMessage, MessageBus, OutboundMessage};

/// Consumes inbound messages and handles each one on its own task.
///
/// Messages for different sessions are processed concurrently; the handler
/// serializes coupon issuance per session.
pub struct AgentRuntime {
    handler: Arc<ConversationHandler>,
    bus: MessageBus,
}

impl AgentRuntime {
    /// Create a runtime over a handler and a bus
    pub fn new(handler: Arc<ConversationHandler>, bus: MessageBus) -> Self {
        Self { handler, bus }
    }

    /// Run until `shutdown` resolves or the inbound queue closes.
    ///
    /// Shutdown is polled first, so queued messages are not picked up once it
    /// has resolved. Messages already being handled are finished before
    /// returning.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                inbound = self.bus.consume_inbound() => match inbound {
                    Ok(message) => {
                        tasks.spawn(dispatch(
                            Arc::clone(&self.handler),
                            self.bus.clone(),
                            message,
                        ));
                    }
                    Err(e) => {
                        warn!(error = %e, "Inbound queue closed, stopping");
                        break;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Message task panicked");
                    }
                }
            }
        }

        info!(pending = tasks.len(), "Draining in-flight messages");
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Message task panicked");
            }
        }
    }
}

/// Acknowledge, handle and answer a single inbound message
pub async fn dispatch(handler: Arc<ConversationHandler>, bus: MessageBus, message: InboundMessage) {
    if let Err(e) = message.validate() {
        warn!(msg_id = %message.msg_id, error = %e, "Dropping inbound message");
        return;
    }

    if let Err(e) = bus.publish_outbound(OutboundMessage::ack(&message)).await {
        warn!(session_id = %message.session_id, error = %e, "Failed to acknowledge message");
    }

    match handler.handle_message(&message.session_id, &message.text).await {
        Ok(reply) => {
            let outbound = OutboundMessage::chat(&message.session_id, reply.text, true);
            if let Err(e) = bus.publish_outbound(outbound).await {
                error!(session_id = %message.session_id, error = %e, "Failed to publish reply");
            }
        }
        Err(e) => {
            error!(session_id = %message.session_id, error = %e, "Failed to handle message");
        }
    }
}
