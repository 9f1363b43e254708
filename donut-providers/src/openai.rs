//! OpenAI-compatible chat completions client
//!
//! Works with any API exposing `POST {base_url}/chat/completions`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ChatRequest, Error, HttpConfig, Message, Provider, Result};

/// OpenAI API client
pub struct OpenAI {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAI {
    /// Create from API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, "https://api.openai.com/v1")
    }

    /// Create with custom base URL (for compatible APIs)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::with_http_config(api_key, base_url, &HttpConfig::default())
    }

    /// Create with custom base URL and HTTP settings
    pub fn with_http_config(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        http: &HttpConfig,
    ) -> Result<Self> {
        let base_url: String = base_url.into();
        Ok(Self {
            client: http.build_client()?,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| Error::ProviderAuth(e.to_string()))?,
        );
        Ok(headers)
    }
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct CompletionBody {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAI {
    fn convert_messages(system_prompt: Option<&str>, messages: Vec<Message>) -> Vec<OpenAIMessage> {
        let mut result = Vec::with_capacity(messages.len() + 1);

        if let Some(prompt) = system_prompt {
            result.push(OpenAIMessage {
                role: "system".to_string(),
                content: prompt.to_string(),
            });
        }

        result.extend(messages.into_iter().map(|msg| OpenAIMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content,
        }));

        result
    }

    fn build_body(request: ChatRequest) -> CompletionBody {
        CompletionBody {
            messages: Self::convert_messages(request.system_prompt.as_deref(), request.messages),
            model: request.model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }

    /// Pull the first choice's text out of a response body
    fn extract_content(body: &str) -> Result<String> {
        let parsed: CompletionResponse = serde_json::from_str(body)
            .map_err(|e| Error::completion(format!("Malformed completion response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::completion("Completion response has no content"))
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let body = Self::build_body(request);
        debug!(model = %body.model, messages = body.messages.len(), "Sending completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::ProviderAuth(format!("Completion API rejected credentials ({})", status)));
        }
        if !status.is_success() {
            return Err(Error::completion(format!(
                "Completion API error {}: {}",
                status, text
            )));
        }

        Self::extract_content(&text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_message_conversion() {
        let messages = vec![Message::user("chocolate glazed")];
        let converted = OpenAI::convert_messages(Some("Be playful"), messages);

        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[0].content, "Be playful");
        assert_eq!(converted[1].role, "user");
    }

    #[test]
    fn test_body_serialization() {
        let body = OpenAI::build_body(ChatRequest {
            model: "asi1".to_string(),
            system_prompt: None,
            messages: vec![Message::user("maple")],
            temperature: None,
            max_tokens: Some(256),
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "asi1");
        assert_eq!(json["max_tokens"], 256);
        assert_eq!(json["stream"], false);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_extract_content() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":" Great choice! "}}]}"#;
        assert_eq!(OpenAI::extract_content(body).unwrap(), "Great choice!");

        assert!(matches!(
            OpenAI::extract_content(r#"{"choices":[]}"#),
            Err(Error::CompletionApi(_))
        ));
        assert!(matches!(
            OpenAI::extract_content("<html>oops</html>"),
            Err(Error::CompletionApi(_))
        ));
    }

    /// Serve a single canned HTTP response on a local port
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            // Read headers and the full body before answering
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "{}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/v1", addr)
    }

    fn request() -> ChatRequest {
        ChatRequest {
            model: "asi1".to_string(),
            system_prompt: Some("Be playful".to_string()),
            messages: vec![Message::user("chocolate glazed")],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_complete_against_local_server() {
        let base_url = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Great choice!"}}]}"#,
        )
        .await;
        let provider = OpenAI::with_base_url("test-key", base_url).unwrap();

        let text = provider.complete(request()).await.unwrap();
        assert_eq!(text, "Great choice!");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let base_url = serve_once("HTTP/1.1 503 Service Unavailable", r#"{"error":"busy"}"#).await;
        let provider = OpenAI::with_base_url("test-key", base_url).unwrap();

        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, Error::CompletionApi(ref msg) if msg.contains("503")));
        assert!(err.is_completion_failure());
    }

    #[tokio::test]
    async fn test_unauthorized_status() {
        let base_url = serve_once("HTTP/1.1 401 Unauthorized", r#"{"error":"bad key"}"#).await;
        let provider = OpenAI::with_base_url("wrong-key", base_url).unwrap();

        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, Error::ProviderAuth(_)));
    }
}
