//! Operator session: the project credentials every check run uses.
//!
//! A single credential context is held for the lifetime of the session.
//! Issuing and rotating the secret is left to whatever sits in front of
//! this service.

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::compliance::ComplianceError;
use crate::core::config::PlatformConfig;
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::platform::CredentialContext;

#[derive(Debug, Default)]
pub struct SessionCredentials {
    current: RwLock<Option<CredentialContext>>,
}

impl SessionCredentials {
    pub fn from_config(platform: &PlatformConfig) -> Option<CredentialContext> {
        match (&platform.endpoint, &platform.service_key) {
            (Some(endpoint), Some(key)) => CredentialContext::new(endpoint, key).ok(),
            _ => None,
        }
    }

    pub async fn set(&self, ctx: CredentialContext) {
        *self.current.write().await = Some(ctx);
    }

    pub async fn clear(&self) -> bool {
        self.current.write().await.take().is_some()
    }

    pub async fn current(&self) -> Option<CredentialContext> {
        self.current.read().await.clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub endpoint: String,
    pub service_key: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SessionStatus {
    pub configured: bool,
    pub endpoint: Option<String>,
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<SessionStatus>, ComplianceError> {
    let ctx = CredentialContext::new(req.endpoint, req.service_key)
        .map_err(|e| ComplianceError::Validation(e.to_string()))?;
    let endpoint = ctx.endpoint().to_string();

    state.session.set(ctx).await;
    info!("Session credentials set for {endpoint}");

    Ok(Json(SessionStatus {
        configured: true,
        endpoint: Some(endpoint),
    }))
}

pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    let current = state.session.current().await;
    Json(SessionStatus {
        configured: current.is_some(),
        endpoint: current.map(|c| c.endpoint().to_string()),
    })
}

pub async fn clear_session(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    if state.session.clear().await {
        info!("Session credentials cleared");
    }
    Json(SessionStatus {
        configured: false,
        endpoint: None,
    })
}

pub fn configure_session_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        ApiUrls::SESSION,
        post(create_session).get(get_session).delete(clear_session),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_clear() {
        let session = SessionCredentials::default();
        assert!(session.current().await.is_none());

        let ctx = CredentialContext::new("https://proj.example.co", "key").expect("ctx");
        session.set(ctx.clone()).await;
        assert_eq!(session.current().await, Some(ctx));

        assert!(session.clear().await);
        assert!(!session.clear().await);
        assert!(session.current().await.is_none());
    }

    #[test]
    fn test_from_config_needs_both_values() {
        let mut platform = PlatformConfig::default();
        assert!(SessionCredentials::from_config(&platform).is_none());

        platform.endpoint = Some("https://proj.example.co".into());
        assert!(SessionCredentials::from_config(&platform).is_none());

        platform.service_key = Some("key".into());
        assert!(SessionCredentials::from_config(&platform).is_some());
    }
}
