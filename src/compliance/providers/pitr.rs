use log::warn;
use std::time::Duration;

use super::bounded;
use crate::compliance::error::CheckError;
use crate::compliance::types::{CheckCategory, PitrFinding};
use crate::platform::BackupProbe;

/// Best-effort, project-wide probe. Anything but a definite answer reports
/// PITR as disabled.
pub async fn check<P>(probe: &P, limit: Duration) -> PitrFinding
where
    P: BackupProbe + ?Sized,
{
    match bounded(limit, probe.pitr_enabled()).await {
        Ok(enabled) => PitrFinding {
            enabled,
            inconclusive: false,
        },
        Err(err) => {
            warn!("{}", CheckError::provider(CheckCategory::Pitr, "project", &err));
            PitrFinding {
                enabled: false,
                inconclusive: true,
            }
        }
    }
}
