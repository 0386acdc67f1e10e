use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckCategory {
    Mfa,
    Rls,
    Pitr,
}

impl CheckCategory {
    pub const ALL: [CheckCategory; 3] = [Self::Mfa, Self::Rls, Self::Pitr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mfa => "MFA",
            Self::Rls => "RLS",
            Self::Pitr => "PITR",
        }
    }
}

impl std::fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MFA" => Ok(Self::Mfa),
            "RLS" => Ok(Self::Rls),
            "PITR" => Ok(Self::Pitr),
            _ => Err(format!("Unknown check category: {s}")),
        }
    }
}

/// Second-factor enrollment of one principal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MfaFinding {
    pub subject_id: String,
    pub subject_label: Option<String>,
    pub enabled: bool,
    /// Set when the finding was synthesized because the listing failed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inconclusive: bool,
}

impl MfaFinding {
    pub fn passed(&self) -> bool {
        self.enabled
    }

    pub fn resource_label(&self) -> &str {
        self.subject_label.as_deref().unwrap_or(&self.subject_id)
    }
}

/// Row-level-security posture of one relation.
///
/// `enabled` is the raw flag reported by the platform; `passed` is the
/// effective status, which also requires at least one policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RlsFinding {
    #[serde(rename = "table")]
    pub resource_label: String,
    pub enabled: bool,
    pub policy_count: u32,
    pub has_policies: bool,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inconclusive: bool,
}

impl RlsFinding {
    pub fn new(resource_label: impl Into<String>, enabled: bool, policy_count: u32) -> Self {
        let has_policies = policy_count > 0;
        Self {
            resource_label: resource_label.into(),
            enabled,
            policy_count,
            has_policies,
            passed: enabled && has_policies,
            inconclusive: false,
        }
    }

    /// Finding reported when the relation could not be inspected.
    pub fn failed_closed(resource_label: impl Into<String>) -> Self {
        Self {
            inconclusive: true,
            ..Self::new(resource_label, false, 0)
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PitrFinding {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inconclusive: bool,
}

impl PitrFinding {
    pub fn passed(&self) -> bool {
        self.enabled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditRecord {
    pub id: i64,
    pub category: CheckCategory,
    pub passed: bool,
    pub resource_label: Option<String>,
    pub observed_at: DateTime<Utc>,
    pub remediation_text: Option<String>,
    pub mechanically_fixable: Option<bool>,
}

/// An audit record before the store has assigned its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditRecord {
    pub category: CheckCategory,
    pub passed: bool,
    pub resource_label: Option<String>,
    pub observed_at: DateTime<Utc>,
    pub remediation_text: Option<String>,
    pub mechanically_fixable: Option<bool>,
}

impl NewAuditRecord {
    pub fn into_record(self, id: i64) -> AuditRecord {
        AuditRecord {
            id,
            category: self.category,
            passed: self.passed,
            resource_label: self.resource_label,
            observed_at: self.observed_at,
            remediation_text: self.remediation_text,
            mechanically_fixable: self.mechanically_fixable,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl ReportSummary {
    fn tally(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub generated_at: DateTime<Utc>,
    pub mfa: Vec<MfaFinding>,
    pub rls: Vec<RlsFinding>,
    pub pitr: PitrFinding,
    pub summary: ReportSummary,
    pub recent_audit: Vec<AuditRecord>,
}

impl ComplianceReport {
    pub fn new(
        mfa: Vec<MfaFinding>,
        rls: Vec<RlsFinding>,
        pitr: PitrFinding,
        recent_audit: Vec<AuditRecord>,
    ) -> Self {
        let mut summary = ReportSummary::default();
        mfa.iter().for_each(|f| summary.tally(f.passed()));
        rls.iter().for_each(|f| summary.tally(f.passed()));
        summary.tally(pitr.passed());

        Self {
            generated_at: Utc::now(),
            mfa,
            rls,
            pitr,
            summary,
            recent_audit,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListAuditQuery {
    pub limit: Option<usize>,
}
