use log::{error, info, warn};
use std::sync::Arc;

use crate::compliance::{AuditLogger, AuditStore, InMemoryAuditStore, PgAuditStore};
use crate::core::config::AppConfig;
use crate::core::session::SessionCredentials;
use crate::core::shared::state::AppState;
use crate::core::shared::utils;
use crate::llm::create_chat_client;
use crate::remediation::RemediationAssistant;

/// Initialize logging from `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .try_init();
}

/// Initialize the audit store: Postgres when a database URL is configured,
/// process memory otherwise.
pub async fn init_audit_store(config: &AppConfig) -> anyhow::Result<Arc<dyn AuditStore>> {
    let Some(database_url) = config.audit.database_url.clone() else {
        warn!("No audit database configured; audit records are kept in memory only");
        return Ok(Arc::new(InMemoryAuditStore::new()));
    };

    let pool = tokio::task::spawn_blocking(move || {
        let pool = utils::create_conn(&database_url)?;
        info!("Running database migrations...");
        if let Err(e) = utils::run_migrations(&pool) {
            error!("Failed to run migrations: {}", e);
            return Err(anyhow::anyhow!("database migrations failed: {e}"));
        }
        info!("Database migrations completed successfully");
        Ok::<_, anyhow::Error>(pool)
    })
    .await??;

    Ok(Arc::new(PgAuditStore::new(pool)))
}

pub async fn build_app_state(config: AppConfig) -> anyhow::Result<Arc<AppState>> {
    let store = init_audit_store(&config).await?;
    let audit = AuditLogger::new(store);

    if config.llm.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        warn!("No LLM API key configured; the remediation assistant will return errors");
    }
    let assistant = RemediationAssistant::new(create_chat_client(&config.llm));

    let preset = SessionCredentials::from_config(&config.platform);
    if config.platform.endpoint.is_some() && preset.is_none() {
        warn!("Ignoring configured platform credentials: endpoint or service key is invalid");
    }

    let state = AppState::new(config, audit, assistant);
    if let Some(ctx) = preset {
        info!("Using configured project {}", ctx.endpoint());
        state.session.set(ctx).await;
    }

    info!(
        "Audit backend: {}, assistant provider: {}",
        state.audit.backend(),
        state.assistant.provider_name()
    );
    Ok(state)
}
