mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{handler_with, ScriptedProvider};
use donut_core::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_messages_same_session_mint_once() {
    let handler = Arc::new(handler_with(ScriptedProvider::replying("Yum!")));

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                handler
                    .handle_message("abc123", &format!("donut #{}", i))
                    .await
            })
        })
        .collect();

    let codes: HashSet<String> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().coupon_code)
        .collect();

    assert_eq!(codes.len(), 1);
    assert_eq!(handler.issuer().issued_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_get_unique_codes() {
    let handler = Arc::new(handler_with(ScriptedProvider::replying("Yum!")));

    let tasks: Vec<_> = (0..200)
        .map(|i| {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                // Two messages per session, racing each other
                let session = format!("session-{}", i % 100);
                handler.handle_message(&session, "glazed").await.map(|r| (session, r.coupon_code))
            })
        })
        .collect();

    let mut by_session = std::collections::HashMap::new();
    for joined in futures::future::join_all(tasks).await {
        let (session, code) = joined.unwrap().unwrap();
        let previous = by_session.insert(session, code.clone());
        if let Some(previous) = previous {
            assert_eq!(previous, code);
        }
    }

    let unique: HashSet<&String> = by_session.values().collect();
    assert_eq!(by_session.len(), 100);
    assert_eq!(unique.len(), 100);
    assert_eq!(handler.issuer().issued_count(), 100);
}

#[test]
fn test_issuer_threads_same_session() {
    let issuer = Arc::new(CouponIssuer::new(CouponPolicy::new("DONUT", None, 5)));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let issuer = Arc::clone(&issuer);
            std::thread::spawn(move || issuer.issue_or_get("abc123").unwrap())
        })
        .collect();

    let codes: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(codes.len(), 1);
}
