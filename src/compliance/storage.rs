use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::warn;

use crate::core::shared::schema::compliance_audit_log;
use crate::core::shared::utils::DbPool;

use super::audit::AuditStore;
use super::error::CheckError;
use super::types::{AuditRecord, CheckCategory, NewAuditRecord};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = compliance_audit_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbAuditRecord {
    pub id: i64,
    pub category: String,
    pub passed: bool,
    pub resource_label: Option<String>,
    pub observed_at: DateTime<Utc>,
    pub remediation_text: Option<String>,
    pub mechanically_fixable: Option<bool>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = compliance_audit_log)]
pub struct NewDbAuditRecord {
    pub category: String,
    pub passed: bool,
    pub resource_label: Option<String>,
    pub observed_at: DateTime<Utc>,
    pub remediation_text: Option<String>,
    pub mechanically_fixable: Option<bool>,
}

impl From<NewAuditRecord> for NewDbAuditRecord {
    fn from(record: NewAuditRecord) -> Self {
        Self {
            category: record.category.to_string(),
            passed: record.passed,
            resource_label: record.resource_label,
            observed_at: record.observed_at,
            remediation_text: record.remediation_text,
            mechanically_fixable: record.mechanically_fixable,
        }
    }
}

pub fn db_record_to_record(db: DbAuditRecord) -> Option<AuditRecord> {
    let category: CheckCategory = match db.category.parse() {
        Ok(category) => category,
        Err(e) => {
            warn!("Skipping audit record #{}: {e}", db.id);
            return None;
        }
    };

    Some(AuditRecord {
        id: db.id,
        category,
        passed: db.passed,
        resource_label: db.resource_label,
        observed_at: db.observed_at,
        remediation_text: db.remediation_text,
        mechanically_fixable: db.mechanically_fixable,
    })
}

/// Postgres-backed audit trail. Writes are single-row inserts; the id comes
/// from the table's sequence.
#[derive(Clone)]
pub struct PgAuditStore {
    pool: DbPool,
}

impl PgAuditStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, CheckError> {
        let pool = self.pool.clone();
        let row = NewDbAuditRecord::from(record);

        let stored = tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| CheckError::LogWrite(e.to_string()))?;

            diesel::insert_into(compliance_audit_log::table)
                .values(&row)
                .returning(DbAuditRecord::as_returning())
                .get_result::<DbAuditRecord>(&mut conn)
                .map_err(|e| CheckError::LogWrite(e.to_string()))
        })
        .await
        .map_err(|e| CheckError::LogWrite(e.to_string()))??;

        db_record_to_record(stored)
            .ok_or_else(|| CheckError::LogWrite("stored record has an unknown category".into()))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>, CheckError> {
        let pool = self.pool.clone();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| CheckError::AuditRead(e.to_string()))?;

            compliance_audit_log::table
                .order(compliance_audit_log::id.desc())
                .limit(limit)
                .select(DbAuditRecord::as_select())
                .load::<DbAuditRecord>(&mut conn)
                .map_err(|e| CheckError::AuditRead(e.to_string()))
        })
        .await
        .map_err(|e| CheckError::AuditRead(e.to_string()))??;

        Ok(rows.into_iter().filter_map(db_record_to_record).collect())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
