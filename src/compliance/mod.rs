//! Security posture checks for one hosted database project: MFA enrollment,
//! row level security and point-in-time recovery, with an audit trail of
//! every outcome.

pub mod audit;
pub mod error;
pub mod handlers;
pub mod providers;
pub mod runner;
pub mod storage;
pub mod types;
pub mod ui;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub use audit::{remediation_for, AuditLogger, AuditStore, InMemoryAuditStore, Remediation};
pub use error::{CheckError, ComplianceError};
pub use runner::{ComplianceRunner, RunSettings};
pub use storage::PgAuditStore;
pub use types::{
    AuditRecord, CheckCategory, ComplianceReport, MfaFinding, PitrFinding, ReportSummary,
    RlsFinding,
};

pub fn configure_compliance_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::COMPLIANCE_RUN, post(handlers::handle_run_checks))
        .route(ApiUrls::COMPLIANCE_AUDIT, get(handlers::handle_list_audit))
}
