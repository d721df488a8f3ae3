//! Domain layer - Core business logic and entities

pub mod api_key;
pub mod error;
pub mod events;
pub mod usage;

pub use api_key::{ApiKey, ApiKeyId, ApiKeyRepository, ApiKeyValidationError};
pub use error::DomainError;
pub use events::{EventSearchBackend, EventSearchQuery, EventSearchResult, ProviderInfo};
pub use usage::{HourBucket, UsageCounter};

impl From<ApiKeyValidationError> for DomainError {
    fn from(err: ApiKeyValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}
