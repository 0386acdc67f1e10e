use log::{info, warn};
use std::sync::Arc;

use super::reference::reference_for;
use super::session::TranscriptEntry;
use crate::compliance::types::CheckCategory;
use crate::llm::{ChatCompletion, ChatMessage, ChatRole, LlmError};

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("The conversation has no user message to answer")]
    EmptyConversation,
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Stateless remediation helper. Every call carries the whole transcript.
#[derive(Clone)]
pub struct RemediationAssistant {
    client: Arc<dyn ChatCompletion>,
}

impl RemediationAssistant {
    pub fn new(client: Arc<dyn ChatCompletion>) -> Self {
        Self { client }
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    pub fn system_prompt(category: CheckCategory, resource_label: Option<&str>) -> String {
        let scope = match resource_label {
            Some(label) => format!("The failing {category} check concerns: {label}."),
            None => format!("The failing check is {category}."),
        };

        format!(
            "You help a project administrator fix a failing security check from the \
             database platform's web dashboard. Answer with dashboard navigation steps \
             (menus, buttons, settings pages). Do not answer with SQL or code, even if asked; \
             point to the matching dashboard screen instead. Keep answers short.\n\n\
             {scope}\n\nReference steps:\n{}",
            reference_for(category)
        )
    }

    /// Returns the model's reply verbatim. Failures are not retried.
    pub async fn converse(
        &self,
        transcript: &[TranscriptEntry],
        category: CheckCategory,
        resource_label: Option<&str>,
    ) -> Result<String, AssistantError> {
        if !transcript.iter().any(|e| e.speaker == ChatRole::User) {
            return Err(AssistantError::EmptyConversation);
        }

        let system = Self::system_prompt(category, resource_label);
        let messages: Vec<ChatMessage> = transcript.iter().map(ChatMessage::from).collect();

        info!(
            "Remediation chat: {category} {} ({} messages, provider {})",
            resource_label.unwrap_or("-"),
            messages.len(),
            self.client.provider_name()
        );

        self.client.complete(&system, &messages).await.map_err(|e| {
            warn!("Remediation assistant failed: {e}");
            AssistantError::Llm(e)
        })
    }
}

impl std::fmt::Debug for RemediationAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemediationAssistant")
            .field("provider", &self.client.provider_name())
            .finish()
    }
}
