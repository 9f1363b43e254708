#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use donut_core::prelude::*;
use tokio::sync::Mutex;

/// What the scripted provider does on every call
#[derive(Debug, Clone)]
pub enum Script {
    Reply(String),
    Fail(String),
    Crash(String),
    Hang(Duration),
}

/// Provider with a fixed behavior, a call counter and the last request seen
pub struct ScriptedProvider {
    script: Script,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Script::Reply(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().await.clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().await = Some(request);
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(msg) => Err(Error::completion(msg.clone())),
            Script::Crash(msg) => Err(Error::Internal(msg.clone())),
            Script::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("too late".to_string())
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Config with a one second completion timeout
pub fn test_config() -> Arc<AgentConfig> {
    let mut config = AgentConfig::default();
    config.completion.timeout_secs = 1;
    Arc::new(config)
}

pub fn handler_with(provider: Arc<ScriptedProvider>) -> ConversationHandler {
    ConversationHandler::new(provider, test_config())
}

/// Handler over `config` with the test completion timeout applied
pub fn handler_with_config(
    provider: Arc<ScriptedProvider>,
    mut config: AgentConfig,
) -> ConversationHandler {
    config.completion.timeout_secs = 1;
    ConversationHandler::new(provider, Arc::new(config))
}
