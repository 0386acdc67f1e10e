//! Read-only view of the hosted database platform.
//!
//! The checks only ever talk to the platform through the three capability
//! traits below, so a different backing platform can be substituted by
//! implementing them. `PlatformClient` is the REST implementation.

pub mod client;
pub mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::PlatformClient;
pub use error::PlatformError;

/// Project endpoint plus the administrative secret used to reach it.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialContext {
    endpoint: String,
    service_key: String,
}

impl CredentialContext {
    pub fn new(
        endpoint: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Result<Self, PlatformError> {
        let endpoint = endpoint.into().trim().trim_end_matches('/').to_string();
        let service_key = service_key.into().trim().to_string();

        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(PlatformError::InvalidCredentials(format!(
                "endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }
        if service_key.is_empty() {
            return Err(PlatformError::InvalidCredentials(
                "service key is empty".to_string(),
            ));
        }

        Ok(Self {
            endpoint,
            service_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn service_key(&self) -> &str {
        &self.service_key
    }
}

impl std::fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialContext")
            .field("endpoint", &self.endpoint)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub label: Option<String>,
    pub factor_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationSummary {
    pub name: String,
    pub rls_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationPolicy {
    pub name: String,
    pub command: Option<String>,
}

#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// One page of principals, 1-based. A page shorter than `per_page` is the last.
    async fn list_principals_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Principal>, PlatformError>;
}

#[async_trait]
pub trait RelationInspector: Send + Sync {
    async fn list_relations(&self, schema: &str) -> Result<Vec<RelationSummary>, PlatformError>;

    async fn list_policies(
        &self,
        schema: &str,
        relation: &str,
    ) -> Result<Vec<RelationPolicy>, PlatformError>;
}

#[async_trait]
pub trait BackupProbe: Send + Sync {
    async fn pitr_enabled(&self) -> Result<bool, PlatformError>;
}

pub trait AdminClient: PrincipalDirectory + RelationInspector + BackupProbe {}

impl<T> AdminClient for T where T: PrincipalDirectory + RelationInspector + BackupProbe {}
