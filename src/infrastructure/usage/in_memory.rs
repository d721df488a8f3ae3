//! In-memory usage counter

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::api_key::ApiKeyId;
use crate::domain::usage::{HourBucket, UsageCounter};
use crate::domain::DomainError;

/// Process-local usage counter.
///
/// Increments are atomic within the process. Counts are not shared with
/// other instances, so this backend is only correct for a single gateway.
#[derive(Debug, Default)]
pub struct InMemoryUsageCounter {
    windows: Arc<RwLock<HashMap<(ApiKeyId, HourBucket), u64>>>,
}

impl InMemoryUsageCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageCounter for InMemoryUsageCounter {
    async fn increment(&self, key_id: &ApiKeyId, bucket: HourBucket) -> Result<u64, DomainError> {
        let mut windows = self.windows.write().await;
        let count = windows.entry((key_id.clone(), bucket)).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn current(&self, key_id: &ApiKeyId, bucket: HourBucket) -> Result<u64, DomainError> {
        let windows = self.windows.read().await;
        Ok(windows.get(&(key_id.clone(), bucket)).copied().unwrap_or(0))
    }
}
