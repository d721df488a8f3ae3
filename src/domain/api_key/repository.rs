//! API Key repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::ApiKey;
use crate::domain::DomainError;

/// Repository trait for API key storage.
///
/// Records are addressed by the one-way hash of the key. Updates touch a
/// single field so that a revocation and a ceiling change issued by
/// different instances never overwrite each other.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Look up a key by its hash
    async fn get_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError>;

    /// Persist a new key; fails with a conflict if the hash is already present
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError>;

    /// Mark a key as revoked. Returns `None` when no key has that hash.
    async fn revoke(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError>;

    /// Replace the hourly ceiling. Returns `None` when no key has that hash.
    async fn set_rate_limit(
        &self,
        key_hash: &str,
        requests_per_hour: u32,
    ) -> Result<Option<ApiKey>, DomainError>;

    /// List all keys, revoked ones included
    async fn list(&self) -> Result<Vec<ApiKey>, DomainError>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
