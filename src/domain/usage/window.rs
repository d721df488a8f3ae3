//! Hour buckets used to scope usage counters

use chrono::{DateTime, TimeZone, Utc};

const SECONDS_PER_HOUR: i64 = 3600;

/// A one-hour window, identified by the number of whole hours since the
/// Unix epoch. A timestamp exactly on the hour belongs to the window that
/// starts at that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HourBucket(i64);

impl HourBucket {
    /// The bucket containing `instant`
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self(instant.timestamp().div_euclid(SECONDS_PER_HOUR))
    }

    /// Hours since the Unix epoch
    pub fn index(&self) -> i64 {
        self.0
    }

    /// First instant of the bucket
    pub fn start(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.0 * SECONDS_PER_HOUR, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// First instant of the following bucket
    pub fn end(&self) -> DateTime<Utc> {
        self.next().start()
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Whole seconds from `now` until the next bucket starts, rounded up.
    ///
    /// Always within `1..=3600` for an instant inside this bucket.
    pub fn seconds_until_end(&self, now: DateTime<Utc>) -> u64 {
        let remaining_ms = (self.end() - now).num_milliseconds();
        let secs = (remaining_ms + 999).div_euclid(1000);
        secs.clamp(1, SECONDS_PER_HOUR) as u64
    }

    /// Label used in store keys, e.g. `2024-06-01-13`
    pub fn label(&self) -> String {
        self.start().format("%Y-%m-%d-%H").to_string()
    }
}

impl std::fmt::Display for HourBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}
