//! API Key domain
//!
//! Domain types and traits for API key management: the stored key record,
//! its validation rules and the repository seam.

mod entity;
mod repository;
mod validation;

pub use entity::{ApiKey, ApiKeyId, DEFAULT_RATE_LIMIT_PER_HOUR};
pub use repository::ApiKeyRepository;
pub use validation::{
    validate_api_key_id, validate_key_name, validate_rate_limit, ApiKeyValidationError,
};
