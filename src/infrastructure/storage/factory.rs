//! Storage factory for creating the key store and usage counter

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::redis::{RedisStore, RedisStoreConfig};
use crate::domain::api_key::ApiKeyRepository;
use crate::domain::usage::UsageCounter;
use crate::domain::DomainError;
use crate::infrastructure::api_key::{InMemoryApiKeyRepository, RedisApiKeyRepository};
use crate::infrastructure::usage::{
    InMemoryUsageCounter, RedisUsageCounter, DEFAULT_USAGE_RETENTION,
};

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// Redis storage shared across instances
    Redis,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "redis" => Some(Self::Redis),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// Redis storage configuration
    Redis {
        store: RedisStoreConfig,
        usage_retention: Duration,
    },
}

impl StorageConfig {
    /// Creates an in-memory storage configuration
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Creates a Redis configuration from a URL
    pub fn redis_url(url: impl Into<String>) -> Self {
        Self::Redis {
            store: RedisStoreConfig::new(url),
            usage_retention: DEFAULT_USAGE_RETENTION,
        }
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Redis { .. } => StorageType::Redis,
        }
    }
}

/// The two stores the gateway depends on
#[derive(Debug, Clone)]
pub struct StorageBackends {
    pub api_keys: Arc<dyn ApiKeyRepository>,
    pub usage: Arc<dyn UsageCounter>,
}

/// Factory for creating storage instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates the key store and usage counter based on the configuration
    pub async fn create(config: &StorageConfig) -> Result<StorageBackends, DomainError> {
        match config {
            StorageConfig::InMemory => {
                info!("Using in-memory key store and usage counter");
                Ok(Self::create_in_memory())
            }
            StorageConfig::Redis {
                store,
                usage_retention,
            } => {
                info!(url = %store.url, prefix = %store.key_prefix, "Connecting to Redis");
                let store = RedisStore::connect(store.clone()).await?;
                info!("Redis connection established");

                Ok(StorageBackends {
                    api_keys: Arc::new(RedisApiKeyRepository::new(store.clone())),
                    usage: Arc::new(RedisUsageCounter::new(store).with_retention(*usage_retention)),
                })
            }
        }
    }

    /// Creates in-memory backends
    pub fn create_in_memory() -> StorageBackends {
        StorageBackends {
            api_keys: Arc::new(InMemoryApiKeyRepository::new()),
            usage: Arc::new(InMemoryUsageCounter::new()),
        }
    }
}
