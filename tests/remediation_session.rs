use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use complyserver::compliance::CheckCategory;
use complyserver::llm::{ChatCompletion, ChatMessage, ChatRole, LlmError};
use complyserver::remediation::{reference_for, ChatSession, RemediationAssistant};

#[derive(Default)]
struct ScriptedModel {
    requests: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

#[async_trait]
impl ChatCompletion for ScriptedModel {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let mut requests = self.requests.lock().expect("lock");
        requests.push((system.to_string(), messages.to_vec()));
        Ok(format!("Step {}", requests.len()))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

#[tokio::test]
async fn test_rls_session_is_seeded_and_resent_in_full() {
    let model = Arc::new(ScriptedModel::default());
    let assistant = RemediationAssistant::new(model.clone());

    let mut session = ChatSession::open(CheckCategory::Rls, Some("orders".to_string()));
    assert_eq!(session.transcript.len(), 1);
    assert_eq!(session.transcript[0].speaker, ChatRole::Assistant);
    assert!(session.transcript[0].text.contains("orders"));
    assert!(session.transcript[0]
        .text
        .contains(reference_for(CheckCategory::Rls)));

    session.push_user("Where do I click?");
    let reply = assistant
        .converse(&session.transcript, session.category, session.resource_label.as_deref())
        .await
        .expect("first reply");
    assert_eq!(reply, "Step 1");
    session.push_assistant(reply);

    session.push_user("And then?");
    let reply = assistant
        .converse(&session.transcript, session.category, session.resource_label.as_deref())
        .await
        .expect("second reply");
    assert_eq!(reply, "Step 2");

    let requests = model.requests.lock().expect("lock");
    assert_eq!(requests.len(), 2);

    let (system, first) = &requests[0];
    assert!(system.contains("orders"));
    assert!(system.contains(reference_for(CheckCategory::Rls)));
    assert_eq!(first.len(), 2);

    let (_, second) = &requests[1];
    let texts: Vec<&str> = second.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(texts.len(), 4);
    assert_eq!(texts[1], "Where do I click?");
    assert_eq!(texts[2], "Step 1");
    assert_eq!(texts[3], "And then?");
}

#[tokio::test]
async fn test_sessions_for_other_categories_use_their_own_reference() {
    for category in [CheckCategory::Mfa, CheckCategory::Pitr] {
        let session = ChatSession::open(category, None);
        let seed = &session.transcript[0].text;
        assert!(seed.contains(reference_for(category)));
        assert!(!seed.contains(reference_for(CheckCategory::Rls)));
    }
}
