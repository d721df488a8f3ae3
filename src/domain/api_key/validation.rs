//! API Key validation utilities

use thiserror::Error;

/// Errors that can occur during API key validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("API key ID cannot be empty")]
    EmptyId,

    #[error("API key ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("API key ID contains invalid character: '{0}'. Only alphanumeric characters and underscores are allowed")]
    InvalidIdCharacter(char),

    #[error("API key name cannot be empty")]
    EmptyName,

    #[error("API key name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Rate limit must be a positive number of requests per hour")]
    InvalidRateLimit,
}

const MAX_API_KEY_ID_LENGTH: usize = 64;
const MAX_API_KEY_NAME_LENGTH: usize = 100;

/// Validate an API key ID
///
/// Rules:
/// - Cannot be empty
/// - Maximum 64 characters
/// - Only ASCII alphanumeric characters and underscores
pub fn validate_api_key_id(id: &str) -> Result<(), ApiKeyValidationError> {
    if id.is_empty() {
        return Err(ApiKeyValidationError::EmptyId);
    }

    if id.len() > MAX_API_KEY_ID_LENGTH {
        return Err(ApiKeyValidationError::IdTooLong(MAX_API_KEY_ID_LENGTH));
    }

    if let Some(c) = id.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(ApiKeyValidationError::InvalidIdCharacter(c));
    }

    Ok(())
}

/// Validate the display name of an API key
pub fn validate_key_name(name: &str) -> Result<(), ApiKeyValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ApiKeyValidationError::EmptyName);
    }

    if trimmed.chars().count() > MAX_API_KEY_NAME_LENGTH {
        return Err(ApiKeyValidationError::NameTooLong(MAX_API_KEY_NAME_LENGTH));
    }

    Ok(())
}

/// Validate an hourly request ceiling
pub fn validate_rate_limit(requests_per_hour: u32) -> Result<(), ApiKeyValidationError> {
    if requests_per_hour == 0 {
        return Err(ApiKeyValidationError::InvalidRateLimit);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_api_key_ids() {
        assert!(validate_api_key_id("key_0123456789abcdef").is_ok());
        assert!(validate_api_key_id("a").is_ok());
        assert!(validate_api_key_id("UPPER_lower_123").is_ok());
    }

    #[test]
    fn test_empty_id() {
        assert_eq!(validate_api_key_id(""), Err(ApiKeyValidationError::EmptyId));
    }

    #[test]
    fn test_invalid_id_character() {
        assert_eq!(
            validate_api_key_id("key:1"),
            Err(ApiKeyValidationError::InvalidIdCharacter(':'))
        );
        assert_eq!(
            validate_api_key_id("key 1"),
            Err(ApiKeyValidationError::InvalidIdCharacter(' '))
        );
    }

    #[test]
    fn test_too_long_id() {
        let long_id = "a".repeat(65);
        assert_eq!(
            validate_api_key_id(&long_id),
            Err(ApiKeyValidationError::IdTooLong(64))
        );

        let max_id = "a".repeat(64);
        assert!(validate_api_key_id(&max_id).is_ok());
    }

    #[test]
    fn test_key_name() {
        assert!(validate_key_name("Test App").is_ok());
        assert_eq!(validate_key_name("   "), Err(ApiKeyValidationError::EmptyName));
        assert_eq!(
            validate_key_name(&"x".repeat(101)),
            Err(ApiKeyValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_rate_limit() {
        assert!(validate_rate_limit(1).is_ok());
        assert!(validate_rate_limit(100).is_ok());
        assert_eq!(
            validate_rate_limit(0),
            Err(ApiKeyValidationError::InvalidRateLimit)
        );
    }
}
