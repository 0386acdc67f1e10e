//! Check providers. Each one turns a platform capability into findings and
//! never propagates upstream failures: an error becomes a failing finding.

pub mod mfa;
pub mod pitr;
pub mod rls;

use std::future::Future;
use std::time::Duration;

use crate::platform::{PlatformError, Principal, PrincipalDirectory};

/// Hard stop for runaway pagination.
const MAX_PRINCIPAL_PAGES: u32 = 10_000;

pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, PlatformError>
where
    F: Future<Output = Result<T, PlatformError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PlatformError::Timeout),
    }
}

/// Lists every principal, page by page. A page shorter than `page_size`
/// ends the listing; any failure discards the partial result.
pub async fn collect_principals<D>(
    directory: &D,
    page_size: u32,
    limit: Duration,
) -> Result<Vec<Principal>, PlatformError>
where
    D: PrincipalDirectory + ?Sized,
{
    let mut principals = Vec::new();

    for page in 1..=MAX_PRINCIPAL_PAGES {
        let batch = bounded(limit, directory.list_principals_page(page, page_size)).await?;
        let fetched = batch.len();
        principals.extend(batch);

        if fetched < page_size as usize {
            return Ok(principals);
        }
    }

    Err(PlatformError::Transport(format!(
        "principal listing did not terminate after {MAX_PRINCIPAL_PAGES} pages"
    )))
}

#[cfg(test)]
pub(crate) mod fakes {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::platform::{
        BackupProbe, PlatformError, Principal, PrincipalDirectory, RelationInspector,
        RelationPolicy, RelationSummary,
    };

    pub fn server_error() -> PlatformError {
        PlatformError::Http {
            status: 502,
            body: "bad gateway".into(),
        }
    }

    pub fn unauthorized() -> PlatformError {
        PlatformError::Unauthorized("HTTP 401: invalid api key".into())
    }

    pub fn principal(id: &str, factors: usize) -> Principal {
        Principal {
            id: id.to_string(),
            label: Some(format!("{id}@example.com")),
            factor_count: factors,
        }
    }

    /// Serves a fixed principal list in pages; optionally fails on one page.
    #[derive(Default)]
    pub struct PagedDirectory {
        pub principals: Vec<Principal>,
        pub fail_on_page: Option<u32>,
        pub reject_credentials: bool,
        pub calls: AtomicU32,
    }

    #[async_trait]
    impl PrincipalDirectory for PagedDirectory {
        async fn list_principals_page(
            &self,
            page: u32,
            per_page: u32,
        ) -> Result<Vec<Principal>, PlatformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reject_credentials {
                return Err(unauthorized());
            }
            if self.fail_on_page == Some(page) {
                return Err(server_error());
            }
            let start = ((page - 1) * per_page) as usize;
            Ok(self
                .principals
                .iter()
                .skip(start)
                .take(per_page as usize)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub struct FakeInspector {
        pub relations: Vec<RelationSummary>,
        pub policies: HashMap<String, usize>,
        pub failing_relations: Vec<String>,
        pub list_fails: bool,
    }

    #[async_trait]
    impl RelationInspector for FakeInspector {
        async fn list_relations(
            &self,
            _schema: &str,
        ) -> Result<Vec<RelationSummary>, PlatformError> {
            if self.list_fails {
                return Err(PlatformError::Http {
                    status: 500,
                    body: "introspection unavailable".into(),
                });
            }
            Ok(self.relations.clone())
        }

        async fn list_policies(
            &self,
            _schema: &str,
            relation: &str,
        ) -> Result<Vec<RelationPolicy>, PlatformError> {
            if self.failing_relations.iter().any(|r| r == relation) {
                return Err(PlatformError::Http {
                    status: 500,
                    body: format!("cannot describe {relation}"),
                });
            }
            let count = self.policies.get(relation).copied().unwrap_or(0);
            Ok((0..count)
                .map(|i| RelationPolicy {
                    name: format!("{relation}_policy_{i}"),
                    command: None,
                })
                .collect())
        }
    }

    /// `None` makes the probe fail.
    pub struct FixedProbe(pub Option<bool>);

    #[async_trait]
    impl BackupProbe for FixedProbe {
        async fn pitr_enabled(&self) -> Result<bool, PlatformError> {
            self.0.ok_or_else(server_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::{principal, PagedDirectory};
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_collect_principals_exhausts_pages() {
        let directory = PagedDirectory {
            principals: (0..5).map(|i| principal(&format!("u{i}"), i % 2)).collect(),
            ..Default::default()
        };

        let all = collect_principals(&directory, 2, Duration::from_secs(1))
            .await
            .expect("list");

        assert_eq!(all.len(), 5);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_collect_principals_full_last_page_needs_one_more_call() {
        let directory = PagedDirectory {
            principals: (0..4).map(|i| principal(&format!("u{i}"), 0)).collect(),
            ..Default::default()
        };

        let all = collect_principals(&directory, 2, Duration::from_secs(1))
            .await
            .expect("list");

        assert_eq!(all.len(), 4);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_collect_principals_failure_is_not_truncated_success() {
        let directory = PagedDirectory {
            principals: (0..5).map(|i| principal(&format!("u{i}"), 1)).collect(),
            fail_on_page: Some(2),
            ..Default::default()
        };

        let result = collect_principals(&directory, 2, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(PlatformError::Http { status: 502, .. })));
    }

    #[tokio::test]
    async fn test_bounded_turns_slow_calls_into_timeouts() {
        let result: Result<(), PlatformError> = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(PlatformError::Timeout)));
    }
}
