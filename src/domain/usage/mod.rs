//! Usage accounting domain
//!
//! Hour buckets and the shared counter that tracks requests per key and hour.

mod counter;
mod window;

pub use counter::UsageCounter;
pub use window::HourBucket;
