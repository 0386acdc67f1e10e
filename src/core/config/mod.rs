//! Layered configuration: built-in defaults, then `complyserver.toml`
//! (or the file named by `COMPLY_CONFIG`), then `COMPLY_*` environment
//! variables. Nested keys use a double underscore: `COMPLY_SERVER__PORT`.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "complyserver.toml";
pub const CONFIG_PATH_ENV: &str = "COMPLY_CONFIG";
pub const ENV_PREFIX: &str = "COMPLY_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub platform: PlatformConfig,
    pub llm: LlmConfig,
    pub audit: AuditConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins granted CORS access. Empty means same-origin only.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Pre-seeds the session credentials when set together with `service_key`.
    pub endpoint: Option<String>,
    pub service_key: Option<String>,
    pub management_url: String,
    pub management_token: Option<String>,
    pub project_ref: Option<String>,
    pub schema: String,
    /// Relations whose name starts with one of these are platform internals.
    pub internal_prefixes: Vec<String>,
    pub relations_rpc: String,
    pub policies_rpc: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            service_key: None,
            management_url: "https://api.supabase.com".to_string(),
            management_token: None,
            project_ref: None,
            schema: "public".to_string(),
            internal_prefixes: vec![
                "pg_".to_string(),
                "_".to_string(),
                "schema_migrations".to_string(),
            ],
            relations_rpc: "list_table_security".to_string(),
            policies_rpc: "list_table_policies".to_string(),
            page_size: 200,
            request_timeout_secs: 15,
        }
    }
}

impl PlatformConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    OpenAI,
    Anthropic,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    pub url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::OpenAI,
            url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1000,
            timeout_secs: 60,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Postgres URL for the audit trail; without it records are kept in memory.
    pub database_url: Option<String>,
    pub recent_window: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            recent_window: 10,
        }
    }
}

impl AppConfig {
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn config_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = Self::figment(path).extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".into()));
        }
        if self.platform.schema.trim().is_empty() {
            return Err(ConfigError::Invalid("platform.schema is empty".into()));
        }
        if self.platform.page_size == 0 {
            return Err(ConfigError::Invalid("platform.page_size must be > 0".into()));
        }
        if self.platform.request_timeout_secs == 0 || self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be > 0".into()));
        }
        if self.audit.recent_window == 0 {
            return Err(ConfigError::Invalid("audit.recent_window must be > 0".into()));
        }
        Ok(())
    }
}
