//! Fetch-a-Donut agent
//!
//! Reads chat messages from stdin as `session_id: text` lines and prints the
//! agent's replies. Configuration comes from `.env`, the environment and an
//! optional YAML file named by `DONUT_CONFIG`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use donut_core::logging;
use donut_core::prelude::*;
use donut_providers::asi_one::AsiOne;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config_path = std::env::var("DONUT_CONFIG").ok().map(PathBuf::from);
    let config = Arc::new(
        AgentConfig::load(config_path.as_deref()).context("Failed to load configuration")?,
    );
    let _log_guard = logging::init_from_config(&config.logging)?;
    info!(agent = %config.name, event = %config.event.name, "Agent starting");
    debug!(completion = ?config.completion, "Completion settings");

    let provider =
        AsiOne::from_config(&config.completion).context("Failed to create ASI:One client")?;
    let handler = Arc::new(ConversationHandler::new(
        Arc::new(provider),
        Arc::clone(&config),
    ));

    let bus = MessageBus::new(config.bus_capacity);
    let runtime = AgentRuntime::new(handler, bus.clone());

    let (eof_tx, eof_rx) = oneshot::channel();
    tokio::spawn(read_stdin(bus.clone(), eof_tx));
    let printer = tokio::spawn(print_outbound(bus.clone()));

    runtime
        .run_until(async {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = eof_rx => {}
            }
        })
        .await;

    // Flush replies the printer has not picked up yet
    printer.abort();
    let _ = printer.await;
    while let Some(message) = bus.try_consume_outbound().await {
        print_message(&message);
    }

    info!("Donut agent shutting down");
    Ok(())
}

/// Publish every stdin line as an inbound message; signal on EOF
async fn read_stdin(bus: MessageBus, eof: oneshot::Sender<()>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(message) = parse_line(&line) else {
                    if !line.trim().is_empty() {
                        warn!("Expected `session_id: text`, ignoring line");
                    }
                    continue;
                };
                if let Err(e) = bus.publish_inbound(message).await {
                    warn!(error = %e, "Failed to publish inbound message");
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                break;
            }
        }
    }
    let _ = eof.send(());
}

async fn print_outbound(bus: MessageBus) {
    while let Ok(message) = bus.consume_outbound().await {
        print_message(&message);
    }
}

fn print_message(message: &OutboundMessage) {
    match message {
        OutboundMessage::Chat { session_id, text, .. } => println!("[{}] {}", session_id, text),
        OutboundMessage::Acknowledgement { acknowledged_msg_id, .. } => {
            debug!(msg_id = %acknowledged_msg_id, "Acknowledged");
        }
    }
}

/// Parse a `session_id: text` line
fn parse_line(line: &str) -> Option<InboundMessage> {
    let (session_id, text) = line.split_once(':')?;
    let session_id = session_id.trim();
    if session_id.is_empty() {
        return None;
    }
    Some(InboundMessage::new(session_id, text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let message = parse_line("abc123: chocolate glazed").unwrap();
        assert_eq!(message.session_id, "abc123");
        assert_eq!(message.text, "chocolate glazed");

        // Only the first colon separates the session
        let message = parse_line("xyz999: note: maple bacon").unwrap();
        assert_eq!(message.text, "note: maple bacon");
    }

    #[test]
    fn test_parse_line_rejects_missing_session() {
        assert!(parse_line("no separator").is_none());
        assert!(parse_line("  : hello").is_none());
    }
}
