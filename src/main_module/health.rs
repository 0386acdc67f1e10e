//! Health check handler

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    let session_configured = state.session.current().await.is_some();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "complyserver",
            "version": env!("CARGO_PKG_VERSION"),
            "audit_backend": state.audit.backend(),
            "assistant_provider": state.assistant.provider_name(),
            "session_configured": session_configured
        })),
    )
}
