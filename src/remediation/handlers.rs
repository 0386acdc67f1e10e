use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::assistant::AssistantError;
use super::session::{ChatSession, TranscriptEntry};
use crate::compliance::types::CheckCategory;
use crate::compliance::ComplianceError;
use crate::core::shared::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub category: CheckCategory,
    #[serde(default)]
    pub resource_label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub category: CheckCategory,
    #[serde(default)]
    pub resource_label: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

impl From<AssistantError> for ComplianceError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::EmptyConversation => Self::Validation(err.to_string()),
            AssistantError::Llm(_) => Self::Upstream(err.to_string()),
        }
    }
}

pub async fn handle_open_session(
    Json(req): Json<OpenSessionRequest>,
) -> Json<ChatSession> {
    Json(ChatSession::open(req.category, req.resource_label))
}

pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ComplianceError> {
    let resource_label = req
        .resource_label
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty());

    let reply = state
        .assistant
        .converse(&req.transcript, req.category, resource_label)
        .await?;

    Ok(Json(ChatReply { reply }))
}
