use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reference::reference_for;
use crate::compliance::types::CheckCategory;
use crate::llm::{ChatMessage, ChatRole};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: ChatRole,
    pub text: String,
    #[serde(default = "Utc::now")]
    pub sent_at: DateTime<Utc>,
}

impl From<&TranscriptEntry> for ChatMessage {
    fn from(entry: &TranscriptEntry) -> Self {
        Self {
            role: entry.speaker,
            content: entry.text.clone(),
        }
    }
}

/// One remediation conversation about a single failing finding. Lives with
/// the caller; the server never stores it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatSession {
    pub category: CheckCategory,
    pub resource_label: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
}

impl ChatSession {
    pub fn open(category: CheckCategory, resource_label: Option<String>) -> Self {
        let resource_label = resource_label
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty());

        let greeting = opening_message(category, resource_label.as_deref());
        let mut session = Self {
            category,
            resource_label,
            transcript: Vec::new(),
        };
        session.push_assistant(greeting);
        session
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &TranscriptEntry {
        self.push(ChatRole::User, text.into())
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) -> &TranscriptEntry {
        self.push(ChatRole::Assistant, text.into())
    }

    fn push(&mut self, speaker: ChatRole, text: String) -> &TranscriptEntry {
        self.transcript.push(TranscriptEntry {
            speaker,
            text,
            sent_at: Utc::now(),
        });
        &self.transcript[self.transcript.len() - 1]
    }
}

fn opening_message(category: CheckCategory, resource_label: Option<&str>) -> String {
    let subject = match (category, resource_label) {
        (CheckCategory::Mfa, Some(label)) => format!("User {label} has no verified second factor."),
        (CheckCategory::Rls, Some(label)) => {
            format!("Table {label} is not protected by row level security with at least one policy.")
        }
        (CheckCategory::Pitr, _) => "Point-in-time recovery is not enabled for this project.".to_string(),
        (_, None) => format!("The {category} check is failing."),
    };

    format!(
        "{subject} Here is how to fix it from the dashboard:\n\n{}\n\nAsk me about any step.",
        reference_for(category)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_seeds_assistant_message_with_resource_and_reference() {
        let session = ChatSession::open(CheckCategory::Rls, Some("orders".into()));

        assert_eq!(session.transcript.len(), 1);
        let first = &session.transcript[0];
        assert_eq!(first.speaker, ChatRole::Assistant);
        assert!(first.text.contains("orders"));
        assert!(first.text.contains(reference_for(CheckCategory::Rls)));
    }

    #[test]
    fn test_blank_resource_label_is_dropped() {
        let session = ChatSession::open(CheckCategory::Mfa, Some("   ".into()));
        assert!(session.resource_label.is_none());
        assert!(session.transcript[0].text.contains("MFA"));
    }

    #[test]
    fn test_transcript_is_append_only_in_order() {
        let mut session = ChatSession::open(CheckCategory::Pitr, None);
        session.push_user("Where is the add-ons page?");
        session.push_assistant("Under Project Settings.");

        let speakers: Vec<_> = session.transcript.iter().map(|e| e.speaker).collect();
        assert_eq!(
            speakers,
            vec![ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
        );
        assert!(session
            .transcript
            .windows(2)
            .all(|pair| pair[0].sent_at <= pair[1].sent_at));
    }

    #[test]
    fn test_entry_without_timestamp_deserializes() {
        let entry: TranscriptEntry =
            serde_json::from_str(r#"{"speaker":"user","text":"hi"}"#).expect("parse");
        assert_eq!(entry.speaker, ChatRole::User);
        assert_eq!(ChatMessage::from(&entry), ChatMessage::user("hi"));
    }
}
