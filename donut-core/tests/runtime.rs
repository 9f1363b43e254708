mod common;

use std::sync::Arc;

use common::{handler_with, ScriptedProvider};
use donut_core::prelude::*;

#[tokio::test]
async fn test_runtime_acknowledges_and_replies() {
    let bus = MessageBus::new(16);
    let handler = Arc::new(handler_with(ScriptedProvider::replying("Great choice!")));
    let runtime = AgentRuntime::new(Arc::clone(&handler), bus.clone());

    let inbound = InboundMessage::new("abc123", "chocolate glazed");
    bus.publish_inbound(inbound.clone()).await.unwrap();
    // Invalid payloads are dropped at the boundary
    bus.publish_inbound(InboundMessage::new("", "no session")).await.unwrap();

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let run = tokio::spawn(async move {
        runtime
            .run_until(async {
                let _ = stop_rx.await;
            })
            .await;
    });

    let ack = bus.consume_outbound().await.unwrap();
    match ack {
        OutboundMessage::Acknowledgement { acknowledged_msg_id, session_id, .. } => {
            assert_eq!(acknowledged_msg_id, inbound.msg_id);
            assert_eq!(session_id, "abc123");
        }
        other => panic!("expected acknowledgement, got {:?}", other),
    }

    let reply = bus.consume_outbound().await.unwrap();
    match reply {
        OutboundMessage::Chat { session_id, text, end_session, .. } => {
            assert_eq!(session_id, "abc123");
            assert!(text.starts_with("Great choice! Here's your ticket: DONUT-"));
            assert!(end_session);
        }
        other => panic!("expected chat reply, got {:?}", other),
    }

    stop_tx.send(()).unwrap();
    run.await.unwrap();

    assert!(bus.try_consume_outbound().await.is_none());
    assert_eq!(handler.issuer().issued_count(), 1);
}

#[tokio::test]
async fn test_shutdown_wins_over_queued_messages() {
    let bus = MessageBus::new(16);
    let provider = ScriptedProvider::replying("Great choice!");
    let handler = Arc::new(handler_with(provider.clone()));
    let runtime = AgentRuntime::new(Arc::clone(&handler), bus.clone());

    for i in 0..3 {
        bus.publish_inbound(InboundMessage::new(format!("s{}", i), "glazed"))
            .await
            .unwrap();
    }

    // Already resolved: the loop must stop before taking any queued message
    runtime.run_until(async {}).await;

    assert!(bus.try_consume_outbound().await.is_none());
    assert_eq!(provider.calls(), 0);
    assert_eq!(handler.issuer().issued_count(), 0);

    // The messages are still queued for the next run
    let next = bus.consume_inbound().await.unwrap();
    assert_eq!(next.session_id, "s0");
}
