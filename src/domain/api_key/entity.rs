//! API Key entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    validate_api_key_id, validate_key_name, validate_rate_limit, ApiKeyValidationError,
};

/// Hourly ceiling applied when none is given at creation
pub const DEFAULT_RATE_LIMIT_PER_HOUR: u32 = 100;

/// Public identifier of an API key.
///
/// Unlike the key itself this value is not a secret; it scopes usage
/// counters and is what appears in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiKeyId(String);

impl ApiKeyId {
    /// Create a new ApiKeyId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, ApiKeyValidationError> {
        let id = id.into();
        validate_api_key_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(format!("key_{}", uuid::Uuid::new_v4().simple()))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ApiKeyId {
    type Error = ApiKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApiKeyId> for String {
    fn from(id: ApiKeyId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored metadata of an API key. The plaintext key is never part of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    id: ApiKeyId,
    key_hash: String,
    name: String,
    rate_limit_per_hour: u32,
    #[serde(default)]
    revoked: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApiKey {
    /// Create a new, active API key record
    pub fn new(
        id: ApiKeyId,
        name: impl Into<String>,
        key_hash: impl Into<String>,
        rate_limit_per_hour: u32,
    ) -> Result<Self, ApiKeyValidationError> {
        let name = name.into().trim().to_string();
        validate_key_name(&name)?;
        validate_rate_limit(rate_limit_per_hour)?;

        let now = Utc::now();

        Ok(Self {
            id,
            key_hash: key_hash.into(),
            name,
            rate_limit_per_hour,
            revoked: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a record read back from storage
    pub fn restore(
        id: ApiKeyId,
        name: String,
        key_hash: String,
        rate_limit_per_hour: u32,
        revoked: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            key_hash,
            name,
            rate_limit_per_hour,
            revoked,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &ApiKeyId {
        &self.id
    }

    pub fn key_hash(&self) -> &str {
        &self.key_hash
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rate_limit_per_hour(&self) -> u32 {
        self.rate_limit_per_hour
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// Whether the key may be used to authenticate
    pub fn is_active(&self) -> bool {
        !self.revoked
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Revoke the key. There is no way back.
    pub fn revoke(&mut self) {
        if !self.revoked {
            self.revoked = true;
            self.updated_at = Utc::now();
        }
    }

    /// Change the hourly ceiling
    pub fn set_rate_limit(&mut self, requests_per_hour: u32) -> Result<(), ApiKeyValidationError> {
        validate_rate_limit(requests_per_hour)?;
        self.rate_limit_per_hour = requests_per_hour;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_key() -> ApiKey {
        ApiKey::new(ApiKeyId::generate(), "Test App", "sha256$abc", 100).unwrap()
    }

    #[test]
    fn test_generated_id_is_valid() {
        let id = ApiKeyId::generate();
        assert!(id.as_str().starts_with("key_"));
        assert!(ApiKeyId::new(id.as_str()).is_ok());
        assert_ne!(ApiKeyId::generate(), id);
    }

    #[test]
    fn test_new_key_is_active() {
        let key = create_test_key();
        assert_eq!(key.name(), "Test App");
        assert_eq!(key.rate_limit_per_hour(), 100);
        assert!(key.is_active());
        assert!(!key.is_revoked());
    }

    #[test]
    fn test_name_is_trimmed() {
        let key = ApiKey::new(ApiKeyId::generate(), "  My App ", "h", 5).unwrap();
        assert_eq!(key.name(), "My App");
    }

    #[test]
    fn test_rejects_zero_rate_limit() {
        let result = ApiKey::new(ApiKeyId::generate(), "Test App", "h", 0);
        assert_eq!(result.unwrap_err(), ApiKeyValidationError::InvalidRateLimit);
    }

    #[test]
    fn test_revoke_is_one_way() {
        let mut key = create_test_key();
        key.revoke();
        assert!(key.is_revoked());

        let updated_at = key.updated_at();
        key.revoke();
        assert!(key.is_revoked());
        assert_eq!(key.updated_at(), updated_at);
    }

    #[test]
    fn test_set_rate_limit() {
        let mut key = create_test_key();
        key.set_rate_limit(250).unwrap();
        assert_eq!(key.rate_limit_per_hour(), 250);

        assert!(key.set_rate_limit(0).is_err());
        assert_eq!(key.rate_limit_per_hour(), 250);
    }

    #[test]
    fn test_serialization_roundtrip_keeps_revocation() {
        let mut key = create_test_key();
        key.revoke();

        let json = serde_json::to_string(&key).unwrap();
        let restored: ApiKey = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id(), key.id());
        assert!(restored.is_revoked());
    }
}
