use std::sync::Arc;

use crate::compliance::audit::AuditLogger;
use crate::compliance::runner::ComplianceRunner;
use crate::core::config::AppConfig;
use crate::core::session::SessionCredentials;
use crate::remediation::RemediationAssistant;

/// Shared by every handler as `State<Arc<AppState>>`.
pub struct AppState {
    pub config: AppConfig,
    pub session: SessionCredentials,
    pub audit: AuditLogger,
    pub runner: ComplianceRunner,
    pub assistant: RemediationAssistant,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        audit: AuditLogger,
        assistant: RemediationAssistant,
    ) -> Arc<Self> {
        let runner = ComplianceRunner::new(audit.clone(), (&config).into());
        Arc::new(Self {
            config,
            session: SessionCredentials::default(),
            audit,
            runner,
            assistant,
        })
    }
}
