use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::api_key::DEFAULT_RATE_LIMIT_PER_HOUR;
use crate::domain::DomainError;
use crate::infrastructure::api_key::DEFAULT_KEY_PREFIX;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::storage::{RedisStoreConfig, StorageConfig, StorageType};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where key records and usage counters live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `memory` or `redis`
    pub backend: String,
    pub redis_url: Option<String>,
    pub key_prefix: String,
    /// How long an hourly counter outlives its window
    pub usage_retention_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiKeysConfig {
    /// Prefix of newly generated keys
    pub prefix: String,
    /// Request header carrying the key
    pub header: String,
    pub default_rate_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Upstream event service; the built-in catalogue is used when unset
    pub upstream_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            redis_url: None,
            key_prefix: "loco".to_string(),
            usage_retention_secs: 7200,
        }
    }
}

impl Default for ApiKeysConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            header: "X-API-Key".to_string(),
            default_rate_limit: DEFAULT_RATE_LIMIT_PER_HOUR,
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            upstream_url: None,
            timeout_secs: 15,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl EventsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl StorageSettings {
    /// Resolve the storage backend settings
    pub fn storage_config(&self) -> Result<StorageConfig, DomainError> {
        let storage_type = StorageType::from_str(&self.backend).ok_or_else(|| {
            DomainError::validation(format!("Unknown storage backend: {}", self.backend))
        })?;

        match storage_type {
            StorageType::InMemory => Ok(StorageConfig::in_memory()),
            StorageType::Redis => {
                let url = self.redis_url.as_deref().ok_or_else(|| {
                    DomainError::validation("storage.redis_url is required for the redis backend")
                })?;

                Ok(StorageConfig::Redis {
                    store: RedisStoreConfig::new(url).with_key_prefix(self.key_prefix.clone()),
                    usage_retention: Duration::from_secs(self.usage_retention_secs),
                })
            }
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load `default` then `local` from `dir`, then `APP__*` overrides
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let dir = dir.as_ref();
        let config = config::Config::builder()
            .add_source(config::File::with_name(&dir.join("default").to_string_lossy()).required(false))
            .add_source(config::File::with_name(&dir.join("local").to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.api_keys.prefix, "loco_");
        assert_eq!(config.api_keys.header, "X-API-Key");
        assert_eq!(config.api_keys.default_rate_limit, 100);
        assert!(config.events.upstream_url.is_none());
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"server": {"port": 9000}, "api_keys": {"default_rate_limit": 20}}"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.api_keys.default_rate_limit, 20);
        assert_eq!(config.api_keys.header, "X-API-Key");
    }

    #[test]
    fn test_storage_config_memory() {
        let settings = StorageSettings::default();
        assert_eq!(
            settings.storage_config().unwrap().storage_type(),
            StorageType::InMemory
        );
    }

    #[test]
    fn test_storage_config_redis() {
        let settings = StorageSettings {
            backend: "redis".to_string(),
            redis_url: Some("redis://localhost:6379".to_string()),
            key_prefix: "test".to_string(),
            usage_retention_secs: 5400,
        };

        match settings.storage_config().unwrap() {
            StorageConfig::Redis {
                store,
                usage_retention,
            } => {
                assert_eq!(store.url, "redis://localhost:6379");
                assert_eq!(store.key_prefix, "test");
                assert_eq!(usage_retention, Duration::from_secs(5400));
            }
            other => panic!("expected redis config, got {:?}", other),
        }
    }

    #[test]
    fn test_storage_config_errors() {
        let missing_url = StorageSettings {
            backend: "redis".to_string(),
            ..Default::default()
        };
        assert!(missing_url.storage_config().is_err());

        let unknown = StorageSettings {
            backend: "firestore".to_string(),
            ..Default::default()
        };
        assert!(unknown.storage_config().is_err());
    }

    #[test]
    fn test_load_from_layers_local_over_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 9000\n\n[api_keys]\ndefault_rate_limit = 20\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("local.toml"), "[server]\nport = 9100\n").unwrap();

        let config = AppConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.api_keys.default_rate_limit, 20);
    }

    #[test]
    fn test_load_from_rejects_malformed_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("local.toml"), "[server]\nport = \"not-a-port\"\n").unwrap();

        assert!(AppConfig::load_from(dir.path()).is_err());
    }
}
