//! API Key infrastructure implementations
//!
//! Key generation and hashing, the key store backends, the key service
//! and the hourly rate gate.

mod generator;
mod rate_limiter;
mod redis_repository;
mod repository;
mod service;

pub use generator::{ApiKeyGenerator, GeneratedApiKey, DEFAULT_KEY_PREFIX};
pub use rate_limiter::{Admission, RateGate, UsageSnapshot};
pub use redis_repository::RedisApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyService, CreateApiKeyResult};

#[cfg(test)]
pub(crate) use rate_limiter::test_support;
