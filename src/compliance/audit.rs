use async_trait::async_trait;
use chrono::Utc;
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::CheckError;
use super::types::{AuditRecord, CheckCategory, NewAuditRecord};

/// Fixed operator guidance attached to failing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remediation {
    pub text: &'static str,
    pub mechanically_fixable: bool,
}

pub fn remediation_for(category: CheckCategory) -> Remediation {
    match category {
        CheckCategory::Mfa => Remediation {
            text: "Ask this user to enroll a second factor (authenticator app or phone) from \
                   their account security settings. Factors cannot be enrolled on a user's behalf.",
            mechanically_fixable: false,
        },
        CheckCategory::Rls => Remediation {
            text: "Enable row level security on this table and add at least one policy that \
                   scopes rows to the users allowed to see them.",
            mechanically_fixable: true,
        },
        CheckCategory::Pitr => Remediation {
            text: "Turn on point-in-time recovery from the project's backup settings. This is a \
                   plan-level add-on and must be enabled by an organization owner.",
            mechanically_fixable: false,
        },
    }
}

/// Append target for audit records. Implementations only need atomic
/// single-record inserts; ids must increase with insertion order.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, CheckError>;

    /// Most recent records first.
    async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>, CheckError>;

    fn backend(&self) -> &'static str;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditStore {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, CheckError> {
        let mut records = self.records.write().await;
        let id = records.last().map_or(1, |r| r.id + 1);
        let stored = record.into_record(id);
        records.push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>, CheckError> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Sole writer of the audit trail.
#[derive(Clone)]
pub struct AuditLogger {
    store: Arc<dyn AuditStore>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        category: CheckCategory,
        passed: bool,
        resource_label: Option<&str>,
    ) -> Result<AuditRecord, CheckError> {
        let (remediation_text, mechanically_fixable) = if passed {
            (None, None)
        } else {
            let remediation = remediation_for(category);
            (
                Some(remediation.text.to_string()),
                Some(remediation.mechanically_fixable),
            )
        };

        let record = self
            .store
            .append(NewAuditRecord {
                category,
                passed,
                resource_label: resource_label.map(str::to_string),
                observed_at: Utc::now(),
                remediation_text,
                mechanically_fixable,
            })
            .await?;

        if !record.passed {
            info!(
                "AUDIT #{} {} failed for {}",
                record.id,
                record.category,
                record.resource_label.as_deref().unwrap_or("project")
            );
        }

        Ok(record)
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>, CheckError> {
        self.store.recent(limit).await
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("backend", &self.store.backend())
            .finish()
    }
}
