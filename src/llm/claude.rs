use async_trait::async_trait;
use log::{info, trace};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{http_client, read_error, ChatCompletion, ChatMessage, ChatRole, LlmError};
use crate::core::config::LlmConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaudeMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeContentBlock {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeResponse {
    #[serde(default)]
    pub id: String,
    pub content: Vec<ClaudeContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug)]
pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
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
        format!("{}/v1/messages", self.base_url)
    }

    fn build_headers(api_key: &str) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Ok(val) = api_key.parse() {
            headers.insert("x-api-key", val);
        }
        if let Ok(val) = ANTHROPIC_VERSION.parse() {
            headers.insert("anthropic-version", val);
        }
        if let Ok(val) = "application/json".parse() {
            headers.insert(reqwest::header::CONTENT_TYPE, val);
        }

        headers
    }

    /// The messages API wants the conversation to open with a user turn, so
    /// any assistant turns before the first user message go into `system`.
    pub fn build_messages(
        system_prompt: &str,
        history: &[ChatMessage],
    ) -> (Option<String>, Vec<ClaudeMessage>) {
        let mut system_parts = Vec::new();
        if !system_prompt.is_empty() {
            system_parts.push(system_prompt.to_string());
        }

        let first_user = history
            .iter()
            .position(|m| m.role == ChatRole::User)
            .unwrap_or(history.len());
        let (leading, rest) = history.split_at(first_user);
        system_parts.extend(leading.iter().map(|m| m.content.clone()));

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        let messages = rest
            .iter()
            .map(|m| ClaudeMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();

        (system, messages)
    }

    fn extract_text_from_response(response: &ClaudeResponse) -> String {
        response
            .content
            .iter()
            .filter(|block| block.content_type == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[async_trait]
impl ChatCompletion for ClaudeClient {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let (system, messages) = Self::build_messages(system, messages);
        if messages.is_empty() {
            return Err(LlmError::Decode("conversation has no user message".into()));
        }

        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages,
            system,
        };

        let url = self.build_url();
        info!("Claude request to {}: model={}", url, self.model);
        trace!("Claude request body: {:?}", serde_json::to_string(&request));

        let response = self
            .client
            .post(&url)
            .headers(Self::build_headers(api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        let result: ClaudeResponse = response.json().await?;
        let text = Self::extract_text_from_response(&result);

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "anthropic"
    }
}
