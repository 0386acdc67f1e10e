use axum::{
    extract::{Query, State},
    Json,
};
use log::info;
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::platform::PlatformClient;

use super::types::{AuditRecord, ComplianceReport, ListAuditQuery};
use super::ComplianceError;

const MAX_AUDIT_PAGE: usize = 100;

pub async fn handle_run_checks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ComplianceReport>, ComplianceError> {
    let credentials = state.session.current().await.ok_or_else(|| {
        ComplianceError::MissingCredentials(
            "Set the project endpoint and service key before running checks".to_string(),
        )
    })?;

    info!("Running compliance checks for {}", credentials.endpoint());

    let client = PlatformClient::new(&credentials, &state.config.platform)
        .map_err(|e| ComplianceError::Internal(e.to_string()))?;
    let report = state.runner.run_all(&client).await?;

    Ok(Json(report))
}

pub async fn handle_list_audit(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListAuditQuery>,
) -> Result<Json<Vec<AuditRecord>>, ComplianceError> {
    let limit = query
        .limit
        .unwrap_or(state.runner.settings().recent_window)
        .clamp(1, MAX_AUDIT_PAGE);

    let records = state.audit.recent(limit).await?;
    Ok(Json(records))
}
