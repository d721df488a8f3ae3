//! Storage infrastructure - backends for the key store and usage counters

mod factory;
mod redis;

pub use factory::{StorageBackends, StorageConfig, StorageFactory, StorageType};
pub use self::redis::{RedisStore, RedisStoreConfig};
