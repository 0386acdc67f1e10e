use async_trait::async_trait;
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::{LlmConfig, LlmProviderKind};

pub mod claude;

pub use claude::ClaudeClient;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("No API key configured for the chat provider")]
    NotConfigured,
    #[error("Chat provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Chat provider request failed: {0}")]
    Transport(String),
    #[error("Chat provider timed out")]
    Timeout,
    #[error("Chat provider returned no text")]
    EmptyResponse,
    #[error("Unexpected chat provider response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// A hosted chat-completion endpoint. One call, one reply; no state is
/// kept between calls.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String, LlmError>;

    fn provider_name(&self) -> &'static str;
}

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
}

pub(crate) async fn read_error(response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!("Chat provider error ({status}): {body}");
    LlmError::Api { status, body }
}

#[derive(Debug)]
pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAIClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: http_client(Duration::from_secs(config.timeout_secs)),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    fn build_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    pub fn build_messages(system: &str, messages: &[ChatMessage]) -> Vec<Value> {
        let mut out = Vec::with_capacity(messages.len() + 1);
        if !system.is_empty() {
            out.push(serde_json::json!({ "role": "system", "content": system }));
        }
        out.extend(
            messages
                .iter()
                .map(|m| serde_json::json!({ "role": m.role.as_str(), "content": m.content })),
        );
        out
    }
}

#[async_trait]
impl ChatCompletion for OpenAIClient {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": Self::build_messages(system, messages),
            "max_tokens": self.max_tokens,
        });
        trace!("Chat completion request: {body}");

        let response = self
            .client
            .post(self.build_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        let result: Value = response.json().await?;
        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content.to_string())
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

pub fn create_chat_client(config: &LlmConfig) -> Arc<dyn ChatCompletion> {
    match config.provider {
        LlmProviderKind::OpenAI => Arc::new(OpenAIClient::new(config)),
        LlmProviderKind::Anthropic => Arc::new(ClaudeClient::new(config)),
    }
}
