//! Usage counter implementations

mod in_memory;
mod redis;

pub use in_memory::InMemoryUsageCounter;
pub use self::redis::{RedisUsageCounter, DEFAULT_USAGE_RETENTION};
