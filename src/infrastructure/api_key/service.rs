//! API Key service
//!
//! Provides high-level operations for API key management.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, DEFAULT_RATE_LIMIT_PER_HOUR};
use crate::domain::DomainError;

use super::generator::{ApiKeyGenerator, GeneratedApiKey};

/// Result of creating a new API key
#[derive(Debug)]
pub struct CreateApiKeyResult {
    /// The API key entity (without the secret)
    pub api_key: ApiKey,
    /// The full secret key (only returned once)
    pub secret: String,
}

/// API Key service for managing API keys
#[derive(Debug, Clone)]
pub struct ApiKeyService {
    repository: Arc<dyn ApiKeyRepository>,
    generator: ApiKeyGenerator,
    default_rate_limit: u32,
}

impl ApiKeyService {
    /// Create a new API key service
    pub fn new(repository: Arc<dyn ApiKeyRepository>) -> Self {
        Self {
            repository,
            generator: ApiKeyGenerator::default(),
            default_rate_limit: DEFAULT_RATE_LIMIT_PER_HOUR,
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Ceiling used when `create` is not given one
    pub fn with_default_rate_limit(mut self, requests_per_hour: u32) -> Self {
        self.default_rate_limit = requests_per_hour;
        self
    }

    /// Create a new API key.
    ///
    /// The returned secret is the only copy of the plaintext key; only its
    /// hash is persisted.
    pub async fn create(
        &self,
        name: &str,
        rate_limit_per_hour: Option<u32>,
    ) -> Result<CreateApiKeyResult, DomainError> {
        let generated = self.generator.generate();
        self.store(name, generated, rate_limit_per_hour).await
    }

    /// Create an API key with a known secret (for testing purposes)
    ///
    /// This is useful for integration tests where a deterministic key is needed.
    pub async fn create_with_secret(
        &self,
        name: &str,
        secret: &str,
        rate_limit_per_hour: Option<u32>,
    ) -> Result<CreateApiKeyResult, DomainError> {
        let generated = self.generator.from_secret(secret);
        self.store(name, generated, rate_limit_per_hour).await
    }

    async fn store(
        &self,
        name: &str,
        generated: GeneratedApiKey,
        rate_limit_per_hour: Option<u32>,
    ) -> Result<CreateApiKeyResult, DomainError> {
        let rate_limit = rate_limit_per_hour.unwrap_or(self.default_rate_limit);
        let api_key = ApiKey::new(ApiKeyId::generate(), name, generated.hash, rate_limit)?;

        info!(
            "Creating API key: id={}, name={}, rate_limit_per_hour={}",
            api_key.id(),
            api_key.name(),
            rate_limit
        );

        let created = self.repository.create(api_key).await?;

        info!("API key created: id={}", created.id());

        Ok(CreateApiKeyResult {
            api_key: created,
            secret: generated.key,
        })
    }

    /// Resolve a plaintext key to its record.
    ///
    /// Unknown and revoked keys both yield `NotFound`.
    pub async fn verify(&self, key_secret: &str) -> Result<ApiKey, DomainError> {
        let hash = ApiKeyGenerator::hash_key(key_secret);

        match self.repository.get_by_hash(&hash).await? {
            Some(key) if key.is_active() => Ok(key),
            Some(key) => {
                debug!("Rejected revoked API key: id={}", key.id());
                Err(DomainError::not_found("API key not found"))
            }
            None => {
                debug!("Rejected unknown API key");
                Err(DomainError::not_found("API key not found"))
            }
        }
    }

    /// Revoke an API key. Revoking an already revoked key succeeds.
    pub async fn revoke(&self, key_secret: &str) -> Result<ApiKey, DomainError> {
        let hash = ApiKeyGenerator::hash_key(key_secret);

        let key = self
            .repository
            .revoke(&hash)
            .await?
            .ok_or_else(|| DomainError::not_found("API key not found"))?;

        info!("API key revoked: id={}", key.id());
        Ok(key)
    }

    /// Change the hourly ceiling of an API key.
    ///
    /// Takes effect on the next admission check; the current window's
    /// count is kept.
    pub async fn set_rate_limit(
        &self,
        key_secret: &str,
        requests_per_hour: u32,
    ) -> Result<ApiKey, DomainError> {
        let hash = ApiKeyGenerator::hash_key(key_secret);

        let key = self
            .repository
            .set_rate_limit(&hash, requests_per_hour)
            .await?
            .ok_or_else(|| DomainError::not_found("API key not found"))?;

        info!(
            "API key rate limit updated: id={}, rate_limit_per_hour={}",
            key.id(),
            requests_per_hour
        );
        Ok(key)
    }

    /// List all API keys
    pub async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        self.repository.list().await
    }

    /// Check that the key store is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }
}
