//! Conversational help for failing findings.

pub mod assistant;
pub mod handlers;
pub mod reference;
pub mod session;

use axum::{routing::post, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub use assistant::{AssistantError, RemediationAssistant};
pub use reference::reference_for;
pub use session::{ChatSession, TranscriptEntry};

pub fn configure_remediation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::REMEDIATION_OPEN, post(handlers::handle_open_session))
        .route(ApiUrls::REMEDIATION_CHAT, post(handlers::handle_chat))
}
