//! Usage counter trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::window::HourBucket;
use crate::domain::api_key::ApiKeyId;
use crate::domain::DomainError;

/// Shared per-key, per-hour request counter.
///
/// `increment` must be linearizable across every gateway instance that
/// shares the store: concurrent callers each observe a distinct
/// post-increment value. Counts are never decremented.
#[async_trait]
pub trait UsageCounter: Send + Sync + Debug {
    /// Atomically add one to the window and return the new count
    async fn increment(&self, key_id: &ApiKeyId, bucket: HourBucket) -> Result<u64, DomainError>;

    /// Read the current count without changing it (0 for an unseen window)
    async fn current(&self, key_id: &ApiKeyId, bucket: HourBucket) -> Result<u64, DomainError>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
