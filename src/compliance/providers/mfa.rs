use log::warn;

use crate::compliance::error::CheckError;
use crate::compliance::types::{CheckCategory, MfaFinding};
use crate::platform::{PlatformError, Principal};

/// Label of the synthetic finding emitted when principals cannot be listed.
pub const UNLISTED_SUBJECT: &str = "*";

pub fn evaluate(principals: &[Principal]) -> Vec<MfaFinding> {
    principals
        .iter()
        .map(|p| MfaFinding {
            subject_id: p.id.clone(),
            subject_label: p.label.clone(),
            enabled: p.factor_count >= 1,
            inconclusive: false,
        })
        .collect()
}

/// Findings for a completed (or failed) principal listing.
pub fn check(listing: Result<&[Principal], &PlatformError>) -> Vec<MfaFinding> {
    match listing {
        Ok(principals) => evaluate(principals),
        Err(err) => {
            warn!("{}", CheckError::provider(CheckCategory::Mfa, UNLISTED_SUBJECT, err));
            vec![MfaFinding {
                subject_id: UNLISTED_SUBJECT.to_string(),
                subject_label: None,
                enabled: false,
                inconclusive: true,
            }]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::providers::fakes::{principal, server_error};

    #[test]
    fn test_enabled_iff_at_least_one_factor() {
        let principals = vec![principal("u1", 0), principal("u2", 1), principal("u3", 3)];
        let findings = evaluate(&principals);

        assert_eq!(findings.len(), 3);
        for (finding, p) in findings.iter().zip(&principals) {
            assert_eq!(finding.enabled, p.factor_count >= 1);
            assert_eq!(finding.subject_id, p.id);
            assert!(!finding.inconclusive);
        }
    }

    #[test]
    fn test_no_principals_no_findings() {
        let none: Vec<Principal> = Vec::new();
        assert!(check(Ok(none.as_slice())).is_empty());
    }

    #[test]
    fn test_listing_failure_fails_closed() {
        let err = server_error();
        let findings = check(Err(&err));

        assert_eq!(findings.len(), 1);
        assert!(!findings[0].enabled);
        assert!(findings[0].inconclusive);
        assert_eq!(findings[0].subject_id, UNLISTED_SUBJECT);
    }
}
