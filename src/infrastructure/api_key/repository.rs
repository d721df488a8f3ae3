//! In-memory API key repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKey, ApiKeyRepository};
use crate::domain::DomainError;

/// In-memory implementation of ApiKeyRepository, keyed by key hash.
///
/// Only visible to the process that owns it; suitable for tests and
/// single-instance development.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    keys: Arc<RwLock<HashMap<String, ApiKey>>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn get_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys.get(key_hash).cloned())
    }

    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        let mut keys = self.keys.write().await;
        let hash = api_key.key_hash().to_string();

        if keys.contains_key(&hash) {
            return Err(DomainError::conflict(format!(
                "API key '{}' already exists",
                api_key.id()
            )));
        }

        keys.insert(hash, api_key.clone());
        Ok(api_key)
    }

    async fn revoke(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError> {
        let mut keys = self.keys.write().await;

        Ok(keys.get_mut(key_hash).map(|key| {
            key.revoke();
            key.clone()
        }))
    }

    async fn set_rate_limit(
        &self,
        key_hash: &str,
        requests_per_hour: u32,
    ) -> Result<Option<ApiKey>, DomainError> {
        let mut keys = self.keys.write().await;

        match keys.get_mut(key_hash) {
            Some(key) => {
                key.set_rate_limit(requests_per_hour)?;
                Ok(Some(key.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        let mut result: Vec<ApiKey> = keys.values().cloned().collect();
        result.sort_by_key(|k| k.created_at());
        Ok(result)
    }
}
