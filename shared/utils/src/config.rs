use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{PortalError, PortalResult};
use crate::logging::LogFormat;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub draft_store: DraftStoreConfig,
    pub draft_api: DraftApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftStoreConfig {
    pub port: u16,
    pub backend: StorageBackend,
    pub redis_url: String,
    pub key_prefix: String,
}

/// Client-side settings for the two-tier draft repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftApiConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
    pub local_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let defaults = Config::try_from(&AppConfig::default())?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with YKK prefix
            .add_source(Environment::with_prefix("YKK").separator("__"));

        config.build()?.try_deserialize()
    }

    /// Rejects settings that would only fail later at first use.
    pub fn validate(&self) -> PortalResult<()> {
        self.logging
            .format
            .parse::<LogFormat>()
            .map_err(|e| PortalError::configuration(e.to_string()))?;

        if let Some(url) = self.draft_api.base_url.as_deref() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(PortalError::configuration(format!(
                    "draft_api.base_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }
        if self.draft_api.timeout_seconds == 0 {
            return Err(PortalError::configuration("draft_api.timeout_seconds must be positive"));
        }
        if self.draft_store.backend == StorageBackend::Redis && self.draft_store.redis_url.trim().is_empty() {
            return Err(PortalError::configuration("draft_store.redis_url is required for the redis backend"));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size: 16 * 1024 * 1024, // 16MB
                timeout_seconds: 30,
            },
            draft_store: DraftStoreConfig {
                port: 8081,
                backend: StorageBackend::Memory,
                redis_url: "redis://localhost:6379".to_string(),
                key_prefix: "ykk:".to_string(),
            },
            draft_api: DraftApiConfig {
                base_url: None,
                timeout_seconds: 10,
                local_path: "data/quotation-drafts.json".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                file_path: None,
            },
        }
    }
}
