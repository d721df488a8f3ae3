//! Hourly rate gate
//!
//! Fixed one-hour windows counted in a shared [`UsageCounter`]. The
//! counter is incremented first and the post-increment value is compared
//! with the ceiling read from the key record at check time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::api_key::ApiKey;
use crate::domain::usage::{HourBucket, UsageCounter};
use crate::domain::DomainError;

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request may proceed
    Admitted {
        /// Ceiling in effect for this check
        limit: u32,
        /// Requests left in the current hour
        remaining: u32,
    },
    /// The ceiling for the current hour has been reached
    Denied {
        limit: u32,
        /// Seconds until the next hour starts
        retry_after_secs: u64,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }

    pub fn limit(&self) -> u32 {
        match self {
            Self::Admitted { limit, .. } | Self::Denied { limit, .. } => *limit,
        }
    }

    pub fn remaining(&self) -> u32 {
        match self {
            Self::Admitted { remaining, .. } => *remaining,
            Self::Denied { .. } => 0,
        }
    }
}

/// Read-only view of a key's current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub limit: u32,
    pub used: u64,
    pub remaining: u32,
    pub resets_in_secs: u64,
}

/// Admits or denies requests against each key's hourly ceiling
#[derive(Debug, Clone)]
pub struct RateGate {
    counter: Arc<dyn UsageCounter>,
}

impl RateGate {
    pub fn new(counter: Arc<dyn UsageCounter>) -> Self {
        Self { counter }
    }

    /// Count one request for `key` at `now` and decide whether it may proceed.
    ///
    /// A counter failure is returned as an error; it never turns into an
    /// admission or a denial.
    pub async fn admit(&self, key: &ApiKey, now: DateTime<Utc>) -> Result<Admission, DomainError> {
        let bucket = HourBucket::containing(now);
        let count = self.counter.increment(key.id(), bucket).await?;
        let limit = key.rate_limit_per_hour();

        if count <= u64::from(limit) {
            let remaining = limit - count as u32;
            debug!(key_id = %key.id(), window = %bucket, count, limit, "Request admitted");
            Ok(Admission::Admitted { limit, remaining })
        } else {
            let retry_after_secs = bucket.seconds_until_end(now);
            debug!(key_id = %key.id(), window = %bucket, count, limit, retry_after_secs, "Request denied");
            Ok(Admission::Denied {
                limit,
                retry_after_secs,
            })
        }
    }

    /// Report the current window for `key` without counting a request
    pub async fn usage(&self, key: &ApiKey, now: DateTime<Utc>) -> Result<UsageSnapshot, DomainError> {
        let bucket = HourBucket::containing(now);
        let used = self.counter.current(key.id(), bucket).await?;
        let limit = key.rate_limit_per_hour();

        Ok(UsageSnapshot {
            limit,
            used,
            remaining: u64::from(limit).saturating_sub(used) as u32,
            resets_in_secs: bucket.seconds_until_end(now),
        })
    }

    /// Check that the counter store is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.counter.ping().await
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::UnavailableUsageCounter;
    use super::*;
    use crate::domain::api_key::ApiKeyId;
    use crate::infrastructure::usage::InMemoryUsageCounter;
    use chrono::TimeZone;
    use futures::future::join_all;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap()
    }

    fn create_key(limit: u32) -> ApiKey {
        ApiKey::new(ApiKeyId::generate(), "Test App", format!("hash-{}", uuid::Uuid::new_v4()), limit)
            .unwrap()
    }

    fn create_gate() -> RateGate {
        RateGate::new(Arc::new(InMemoryUsageCounter::new()))
    }

    #[tokio::test]
    async fn test_counts_down_then_denies() {
        let gate = create_gate();
        let key = create_key(3);
        let now = at(12, 10, 0);

        for expected in [2, 1, 0] {
            let admission = gate.admit(&key, now).await.unwrap();
            assert_eq!(admission, Admission::Admitted { limit: 3, remaining: expected });
        }

        match gate.admit(&key, now).await.unwrap() {
            Admission::Denied { limit, retry_after_secs } => {
                assert_eq!(limit, 3);
                assert_eq!(retry_after_secs, 50 * 60);
            }
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retry_after_is_within_one_hour() {
        let gate = create_gate();

        for now in [at(12, 0, 0), at(12, 30, 0), at(12, 59, 59)] {
            let key = create_key(1);
            gate.admit(&key, now).await.unwrap();
            let Admission::Denied { retry_after_secs, .. } = gate.admit(&key, now).await.unwrap()
            else {
                panic!("expected denial");
            };
            assert!(retry_after_secs > 0);
            assert!(retry_after_secs <= 3600);
        }
    }

    #[tokio::test]
    async fn test_hour_boundary_starts_new_window() {
        let gate = create_gate();
        let key = create_key(5);

        let first = gate.admit(&key, at(12, 59, 59)).await.unwrap();
        assert_eq!(first.remaining(), 4);

        gate.admit(&key, at(12, 59, 59)).await.unwrap();

        let next_hour = gate.admit(&key, at(13, 0, 1)).await.unwrap();
        assert_eq!(next_hour.remaining(), 4);

        let snapshot = gate.usage(&key, at(13, 0, 1)).await.unwrap();
        assert_eq!(snapshot.used, 1);
    }

    #[tokio::test]
    async fn test_exact_boundary_lands_in_one_window() {
        let gate = create_gate();
        let key = create_key(5);

        gate.admit(&key, at(13, 0, 0)).await.unwrap();

        assert_eq!(gate.usage(&key, at(12, 59, 59)).await.unwrap().used, 0);
        assert_eq!(gate.usage(&key, at(13, 0, 0)).await.unwrap().used, 1);
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let gate = create_gate();
        let key_a = create_key(2);
        let key_b = create_key(2);
        let now = at(9, 0, 0);

        gate.admit(&key_a, now).await.unwrap();
        gate.admit(&key_a, now).await.unwrap();
        assert!(!gate.admit(&key_a, now).await.unwrap().is_admitted());

        let snapshot = gate.usage(&key_b, now).await.unwrap();
        assert_eq!(snapshot.remaining, 2);
        assert_eq!(gate.admit(&key_b, now).await.unwrap().remaining(), 1);
    }

    #[tokio::test]
    async fn test_ceiling_change_applies_to_next_check() {
        let gate = create_gate();
        let mut key = create_key(2);
        let now = at(9, 0, 0);

        gate.admit(&key, now).await.unwrap();
        gate.admit(&key, now).await.unwrap();
        assert!(!gate.admit(&key, now).await.unwrap().is_admitted());

        // Count is now 3; raising the ceiling to 5 admits the 4th and 5th
        key.set_rate_limit(5).unwrap();
        assert_eq!(gate.admit(&key, now).await.unwrap().remaining(), 1);
        assert_eq!(gate.admit(&key, now).await.unwrap().remaining(), 0);
        assert!(!gate.admit(&key, now).await.unwrap().is_admitted());

        key.set_rate_limit(1).unwrap();
        assert_eq!(gate.usage(&key, now).await.unwrap().remaining, 0);
    }

    #[tokio::test]
    async fn test_usage_does_not_count() {
        let gate = create_gate();
        let key = create_key(10);
        let now = at(9, 0, 0);

        gate.admit(&key, now).await.unwrap();
        for _ in 0..3 {
            let snapshot = gate.usage(&key, now).await.unwrap();
            assert_eq!(snapshot.used, 1);
            assert_eq!(snapshot.remaining, 9);
            assert_eq!(snapshot.resets_in_secs, 3600);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_admissions_respect_ceiling() {
        let gate = create_gate();
        let key = create_key(50);
        let now = at(15, 20, 0);

        let tasks = (0..120).map(|_| {
            let gate = gate.clone();
            let key = key.clone();
            tokio::spawn(async move { gate.admit(&key, now).await.unwrap() })
        });

        let results: Vec<Admission> = join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        let admitted = results.iter().filter(|a| a.is_admitted()).count();
        assert_eq!(admitted, 50);

        let mut remaining: Vec<u32> = results
            .iter()
            .filter(|a| a.is_admitted())
            .map(|a| a.remaining())
            .collect();
        remaining.sort_unstable();
        assert_eq!(remaining, (0..50).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error() {
        let gate = RateGate::new(Arc::new(UnavailableUsageCounter));
        let key = create_key(10);

        let result = gate.admit(&key, at(9, 0, 0)).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
        assert!(gate.ping().await.is_err());
    }
}
