use log::{info, warn};
use std::time::Duration;

use super::audit::AuditLogger;
use super::error::CheckError;
use super::providers::{self, mfa, pitr, rls};
use super::types::{CheckCategory, ComplianceReport};
use crate::core::config::AppConfig;
use crate::platform::AdminClient;

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub schema: String,
    pub internal_prefixes: Vec<String>,
    pub page_size: u32,
    pub call_timeout: Duration,
    pub recent_window: usize,
}

impl RunSettings {
    /// Relations whose name starts with a configured prefix are platform internals.
    pub fn is_internal(&self, relation: &str) -> bool {
        self.internal_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && relation.starts_with(prefix.as_str()))
    }
}

impl From<&AppConfig> for RunSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            schema: config.platform.schema.clone(),
            internal_prefixes: config.platform.internal_prefixes.clone(),
            page_size: config.platform.page_size.max(1),
            call_timeout: config.platform.request_timeout(),
            recent_window: config.audit.recent_window,
        }
    }
}

/// Runs the three checks against one project and records every finding.
#[derive(Debug, Clone)]
pub struct ComplianceRunner {
    logger: AuditLogger,
    settings: RunSettings,
}

impl ComplianceRunner {
    pub fn new(logger: AuditLogger, settings: RunSettings) -> Self {
        Self { logger, settings }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// The principal listing doubles as the credential probe: if the
    /// platform rejects it, nothing else runs and nothing is written.
    pub async fn run_all<C>(&self, client: &C) -> Result<ComplianceReport, CheckError>
    where
        C: AdminClient + ?Sized,
    {
        let settings = &self.settings;

        let listing =
            providers::collect_principals(client, settings.page_size, settings.call_timeout).await;
        if let Err(err) = &listing {
            if err.is_auth() {
                warn!("Compliance run aborted: {err}");
                return Err(CheckError::Authentication(err.to_string()));
            }
        }

        let mfa_findings = mfa::check(listing.as_deref());

        let (rls_findings, pitr_finding) = tokio::join!(
            rls::check(
                client,
                &settings.schema,
                |name| settings.is_internal(name),
                settings.call_timeout,
            ),
            pitr::check(client, settings.call_timeout),
        );

        for finding in &mfa_findings {
            self.log(CheckCategory::Mfa, finding.passed(), Some(finding.resource_label()))
                .await;
        }
        for finding in &rls_findings {
            self.log(CheckCategory::Rls, finding.passed(), Some(&finding.resource_label))
                .await;
        }
        self.log(CheckCategory::Pitr, pitr_finding.passed(), None)
            .await;

        let recent_audit = match self.logger.recent(settings.recent_window).await {
            Ok(records) => records,
            Err(err) => {
                warn!("Could not read back recent audit records: {err}");
                Vec::new()
            }
        };

        let report = ComplianceReport::new(mfa_findings, rls_findings, pitr_finding, recent_audit);
        info!(
            "Compliance run complete: {} checks, {} passed, {} failed",
            report.summary.total, report.summary.passed, report.summary.failed
        );

        Ok(report)
    }

    /// A failed audit write must not change the check's result.
    async fn log(&self, category: CheckCategory, passed: bool, resource_label: Option<&str>) {
        if let Err(err) = self.logger.record(category, passed, resource_label).await {
            warn!(
                "Dropping {category} audit record for {}: {err}",
                resource_label.unwrap_or("project")
            );
        }
    }
}
