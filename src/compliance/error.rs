use axum::{response::IntoResponse, Json};

use super::types::CheckCategory;
use crate::platform::PlatformError;

/// Failures raised while running the checks.
///
/// Only `Authentication` ever leaves `ComplianceRunner::run_all`. Providers
/// build `Provider` for the failures they log before failing closed, and
/// the audit variants are recovered by the runner.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("{category} check failed for {resource}: {message}")]
    Provider {
        category: CheckCategory,
        resource: String,
        message: String,
    },
    #[error("Audit log write failed: {0}")]
    LogWrite(String),
    #[error("Audit log read failed: {0}")]
    AuditRead(String),
}

impl CheckError {
    pub fn provider(category: CheckCategory, resource: &str, err: &PlatformError) -> Self {
        Self::Provider {
            category,
            resource: resource.to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComplianceError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("No credentials: {0}")]
    MissingCredentials(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CheckError> for ComplianceError {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::Authentication(msg) => Self::Unauthorized(msg),
            CheckError::LogWrite(msg) | CheckError::AuditRead(msg) => Self::Database(msg),
            other @ CheckError::Provider { .. } => Self::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for ComplianceError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, message) = match &self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::MissingCredentials(msg) => (StatusCode::PRECONDITION_FAILED, msg.clone()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            Self::Database(msg) | Self::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_authentication_maps_to_unauthorized() {
        let err: ComplianceError = CheckError::Authentication("bad key".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_missing_credentials_status() {
        let err = ComplianceError::MissingCredentials("set a project first".into());
        assert_eq!(err.into_response().status(), StatusCode::PRECONDITION_FAILED);
    }

    #[test]
    fn test_provider_error_message_names_resource() {
        let err = CheckError::provider(
            CheckCategory::Rls,
            "logs",
            &PlatformError::Http {
                status: 500,
                body: "boom".into(),
            },
        );
        let text = err.to_string();
        assert!(text.contains("RLS"));
        assert!(text.contains("logs"));
        assert!(text.contains("boom"));
    }
}
