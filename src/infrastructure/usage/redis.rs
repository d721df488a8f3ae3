//! Redis usage counter
//!
//! One string key per window, `<prefix>:usage:<key id>:<YYYY-MM-DD-HH>`,
//! bumped with `INCR` and given a TTL in the same `MULTI` block.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::domain::api_key::ApiKeyId;
use crate::domain::usage::{HourBucket, UsageCounter};
use crate::domain::DomainError;
use crate::infrastructure::storage::RedisStore;

/// How long a window outlives its hour by default
pub const DEFAULT_USAGE_RETENTION: Duration = Duration::from_secs(2 * 3600);

/// Usage counter shared by every gateway instance pointed at the same Redis
#[derive(Debug, Clone)]
pub struct RedisUsageCounter {
    store: RedisStore,
    retention: Duration,
}

impl RedisUsageCounter {
    pub fn new(store: RedisStore) -> Self {
        Self {
            store,
            retention: DEFAULT_USAGE_RETENTION,
        }
    }

    /// Set how long windows are kept; never shorter than one hour
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention.max(Duration::from_secs(3600));
        self
    }

    fn window_key(&self, key_id: &ApiKeyId, bucket: HourBucket) -> String {
        self.store
            .prefix_key(&format!("usage:{}:{}", key_id, bucket.label()))
    }
}

#[async_trait]
impl UsageCounter for RedisUsageCounter {
    async fn increment(&self, key_id: &ApiKeyId, bucket: HourBucket) -> Result<u64, DomainError> {
        let window_key = self.window_key(key_id, bucket);
        let mut conn = self.store.connection();

        let (count,): (u64,) = redis::pipe()
            .atomic()
            .incr(&window_key, 1u64)
            .expire(&window_key, self.retention.as_secs() as i64)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to increment usage for '{}': {}", key_id, e))
            })?;

        Ok(count)
    }

    async fn current(&self, key_id: &ApiKeyId, bucket: HourBucket) -> Result<u64, DomainError> {
        let mut conn = self.store.connection();

        let count: Option<u64> = conn.get(self.window_key(key_id, bucket)).await.map_err(|e| {
            DomainError::storage(format!("Failed to read usage for '{}': {}", key_id, e))
        })?;

        Ok(count.unwrap_or(0))
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.store.ping().await
    }
}
