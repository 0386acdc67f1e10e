use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::{
    BackupProbe, CredentialContext, PlatformError, Principal, PrincipalDirectory,
    RelationInspector, RelationPolicy, RelationSummary,
};
use crate::core::config::PlatformConfig;

#[derive(Debug, Deserialize)]
struct UsersResponse {
    users: Vec<UserRecord>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    factors: Option<Vec<FactorRecord>>,
}

#[derive(Debug, Deserialize)]
struct FactorRecord {
    #[serde(default)]
    status: Option<String>,
}

impl FactorRecord {
    /// Factors without a status are counted; unverified enrollments are not.
    fn is_registered(&self) -> bool {
        self.status
            .as_deref()
            .map_or(true, |s| s.eq_ignore_ascii_case("verified"))
    }
}

impl From<UserRecord> for Principal {
    fn from(user: UserRecord) -> Self {
        let label = user
            .email
            .filter(|e| !e.is_empty())
            .or(user.phone.filter(|p| !p.is_empty()));
        let factor_count = user
            .factors
            .unwrap_or_default()
            .iter()
            .filter(|f| f.is_registered())
            .count();

        Self {
            id: user.id,
            label,
            factor_count,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelationRow {
    #[serde(alias = "name", alias = "relname")]
    table_name: String,
    #[serde(alias = "relrowsecurity", default)]
    rls_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct PolicyRow {
    #[serde(alias = "policyname", alias = "name")]
    policy_name: String,
    #[serde(alias = "cmd", default)]
    command: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BackupsResponse {
    #[serde(default)]
    pitr_enabled: Option<bool>,
}

/// REST client for one project, built per session from its credentials.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: Client,
    endpoint: String,
    service_key: String,
    relations_rpc: String,
    policies_rpc: String,
    management_url: String,
    management_token: Option<String>,
    project_ref: Option<String>,
}

impl PlatformClient {
    pub fn new(ctx: &CredentialContext, config: &PlatformConfig) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let project_ref = config
            .project_ref
            .clone()
            .filter(|r| !r.is_empty())
            .or_else(|| project_ref_from_endpoint(ctx.endpoint()));

        Ok(Self {
            client,
            endpoint: ctx.endpoint().to_string(),
            service_key: ctx.service_key().to_string(),
            relations_rpc: config.relations_rpc.clone(),
            policies_rpc: config.policies_rpc.clone(),
            management_url: config.management_url.trim_end_matches('/').to_string(),
            management_token: config.management_token.clone().filter(|t| !t.is_empty()),
            project_ref,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.endpoint, function)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, PlatformError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(PlatformError::Unauthorized(format!("HTTP {status}: {body}")))
            }
            _ => Err(PlatformError::Http {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

/// `https://<ref>.supabase.co` style endpoints carry the project ref as the first host label.
fn project_ref_from_endpoint(endpoint: &str) -> Option<String> {
    let host = endpoint
        .split("://")
        .nth(1)?
        .split(['/', ':'])
        .next()?;
    let mut labels = host.split('.');
    let first = labels.next()?;
    let rest: Vec<&str> = labels.collect();
    if rest.len() >= 2 && rest.last() == Some(&"co") && rest.contains(&"supabase") {
        Some(first.to_string())
    } else {
        None
    }
}

#[async_trait]
impl PrincipalDirectory for PlatformClient {
    async fn list_principals_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Principal>, PlatformError> {
        let url = format!("{}/auth/v1/admin/users", self.endpoint);
        debug!("Listing principals page {page} ({per_page} per page)");

        let request = self
            .authorized(self.client.get(&url))
            .query(&[("page", page), ("per_page", per_page)]);
        let response = self.send(request).await?;
        let body: UsersResponse = response.json().await?;

        Ok(body.users.into_iter().map(Principal::from).collect())
    }
}

#[async_trait]
impl RelationInspector for PlatformClient {
    async fn list_relations(&self, schema: &str) -> Result<Vec<RelationSummary>, PlatformError> {
        let request = self
            .authorized(self.client.post(self.rpc_url(&self.relations_rpc)))
            .json(&serde_json::json!({ "schema_name": schema }));
        let response = self.send(request).await?;
        let rows: Vec<RelationRow> = response.json().await?;
        trace!("Schema {schema} has {} relations", rows.len());

        Ok(rows
            .into_iter()
            .map(|row| RelationSummary {
                name: row.table_name,
                rls_enabled: row.rls_enabled,
            })
            .collect())
    }

    async fn list_policies(
        &self,
        schema: &str,
        relation: &str,
    ) -> Result<Vec<RelationPolicy>, PlatformError> {
        let request = self
            .authorized(self.client.post(self.rpc_url(&self.policies_rpc)))
            .json(&serde_json::json!({ "schema_name": schema, "table_name": relation }));
        let response = self.send(request).await?;

        // Some RPC wrappers return `null` for a relation without policies.
        let value: Value = response.json().await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        let rows: Vec<PolicyRow> =
            serde_json::from_value(value).map_err(|e| PlatformError::Decode(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| RelationPolicy {
                name: row.policy_name,
                command: row.command,
            })
            .collect())
    }
}

#[async_trait]
impl BackupProbe for PlatformClient {
    async fn pitr_enabled(&self) -> Result<bool, PlatformError> {
        let token = self.management_token.as_deref().ok_or_else(|| {
            PlatformError::Unsupported("no management token configured for the PITR probe".into())
        })?;
        let project_ref = self.project_ref.as_deref().ok_or_else(|| {
            PlatformError::Unsupported("project ref unknown for the PITR probe".into())
        })?;

        let url = format!(
            "{}/v1/projects/{}/database/backups",
            self.management_url, project_ref
        );
        let response = self.send(self.client.get(&url).bearer_auth(token)).await?;
        let body: BackupsResponse = response.json().await?;

        body.pitr_enabled
            .ok_or_else(|| PlatformError::Decode("backup response has no pitr_enabled".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard, config: PlatformConfig) -> PlatformClient {
        let ctx = CredentialContext::new(server.url(), "service-key").expect("ctx");
        PlatformClient::new(&ctx, &config).expect("client")
    }

    #[test]
    fn test_project_ref_from_endpoint() {
        assert_eq!(
            project_ref_from_endpoint("https://abcd1234.supabase.co"),
            Some("abcd1234".to_string())
        );
        assert_eq!(project_ref_from_endpoint("http://127.0.0.1:54321"), None);
        assert_eq!(project_ref_from_endpoint("https://db.internal.example.com"), None);
    }

    #[tokio::test]
    async fn test_list_principals_counts_verified_factors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth/v1/admin/users")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("per_page".into(), "50".into()),
            ]))
            .match_header("apikey", "service-key")
            .match_header("authorization", "Bearer service-key")
            .with_status(200)
            .with_body(
                r#"{"users":[
                    {"id":"u1","email":"a@example.com","factors":[{"status":"verified"}]},
                    {"id":"u2","email":"b@example.com","factors":[{"status":"unverified"}]},
                    {"id":"u3","phone":"+15550100"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server, PlatformConfig::default());
        let principals = client.list_principals_page(1, 50).await.expect("list");

        mock.assert_async().await;
        assert_eq!(principals.len(), 3);
        assert_eq!(principals[0].factor_count, 1);
        assert_eq!(principals[1].factor_count, 0);
        assert_eq!(principals[2].label.as_deref(), Some("+15550100"));
        assert_eq!(principals[2].factor_count, 0);
    }

    #[tokio::test]
    async fn test_users_body_without_users_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/auth/v1/admin/users")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"unexpected gateway page"}"#)
            .create_async()
            .await;

        let client = client_for(&server, PlatformConfig::default());
        let err = client.list_principals_page(1, 50).await.expect_err("decode");
        assert!(matches!(err, PlatformError::Decode(_)));
        assert!(!err.is_auth());
    }

    #[tokio::test]
    async fn test_unauthorized_is_distinguishable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/auth/v1/admin/users")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message":"Invalid API key"}"#)
            .create_async()
            .await;

        let client = client_for(&server, PlatformConfig::default());
        let err = client.list_principals_page(1, 50).await.expect_err("401");
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_empty_user_list_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/auth/v1/admin/users")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"users":[]}"#)
            .create_async()
            .await;

        let client = client_for(&server, PlatformConfig::default());
        let principals = client.list_principals_page(1, 50).await.expect("list");
        assert!(principals.is_empty());
    }

    #[tokio::test]
    async fn test_relations_and_policies_rpc() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/rpc/list_table_security")
            .match_body(Matcher::Json(serde_json::json!({ "schema_name": "public" })))
            .with_status(200)
            .with_body(r#"[{"table_name":"orders","rls_enabled":true},{"relname":"logs","relrowsecurity":false}]"#)
            .create_async()
            .await;
        server
            .mock("POST", "/rest/v1/rpc/list_table_policies")
            .match_body(Matcher::PartialJson(serde_json::json!({ "table_name": "orders" })))
            .with_status(200)
            .with_body(r#"[{"policyname":"owner_read","cmd":"SELECT"},{"policy_name":"owner_write"}]"#)
            .create_async()
            .await;
        server
            .mock("POST", "/rest/v1/rpc/list_table_policies")
            .match_body(Matcher::PartialJson(serde_json::json!({ "table_name": "logs" })))
            .with_status(200)
            .with_body("null")
            .create_async()
            .await;

        let client = client_for(&server, PlatformConfig::default());
        let relations = client.list_relations("public").await.expect("relations");
        assert_eq!(relations.len(), 2);
        assert!(relations[0].rls_enabled);
        assert_eq!(relations[1].name, "logs");

        let policies = client.list_policies("public", "orders").await.expect("policies");
        assert_eq!(policies.len(), 2);
        assert_eq!(policies[0].command.as_deref(), Some("SELECT"));

        let none = client.list_policies("public", "logs").await.expect("policies");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_rpc_server_error_carries_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/rpc/list_table_security")
            .with_status(404)
            .with_body("function not found")
            .create_async()
            .await;

        let client = client_for(&server, PlatformConfig::default());
        match client.list_relations("public").await {
            Err(PlatformError::Http { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("function not found"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pitr_probe_requires_management_token() {
        let server = mockito::Server::new_async().await;
        let client = client_for(&server, PlatformConfig::default());
        let err = client.pitr_enabled().await.expect_err("unsupported");
        assert!(matches!(err, PlatformError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_pitr_probe_reads_management_api() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/projects/proj1/database/backups")
            .match_header("authorization", "Bearer mgmt-token")
            .with_status(200)
            .with_body(r#"{"region":"us-east-1","pitr_enabled":true,"backups":[]}"#)
            .create_async()
            .await;

        let config = PlatformConfig {
            management_url: server.url(),
            management_token: Some("mgmt-token".into()),
            project_ref: Some("proj1".into()),
            ..PlatformConfig::default()
        };
        let client = client_for(&server, config);

        assert!(client.pitr_enabled().await.expect("probe"));
        mock.assert_async().await;
    }
}
