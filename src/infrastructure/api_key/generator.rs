//! API Key generation
//!
//! Generates cryptographically secure API keys and their one-way hashes.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Prefix carried by every key issued by this service
pub const DEFAULT_KEY_PREFIX: &str = "loco_";

const HASH_SCHEME: &str = "sha256$";

/// Result of generating a new API key
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// The full API key (only shown once at creation)
    pub key: String,
    /// The hashed key for storage
    pub hash: String,
}

/// Generator for secure API keys
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    /// Prefix for all generated keys (e.g., "loco_")
    prefix: String,
    /// Number of random bytes to generate
    key_bytes: usize,
}

impl ApiKeyGenerator {
    /// Create a new API key generator
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            key_bytes: 32,
        }
    }

    /// Set the number of random bytes
    pub fn with_key_bytes(mut self, bytes: usize) -> Self {
        self.key_bytes = bytes;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a new API key
    pub fn generate(&self) -> GeneratedApiKey {
        let mut random_bytes = vec![0u8; self.key_bytes];
        OsRng.fill_bytes(&mut random_bytes);

        let key = format!("{}{}", self.prefix, URL_SAFE_NO_PAD.encode(&random_bytes));
        let hash = Self::hash_key(&key);

        GeneratedApiKey { key, hash }
    }

    /// Generate a key from a known secret (for testing purposes)
    ///
    /// This allows creating deterministic keys for integration testing.
    pub fn from_secret(&self, secret: &str) -> GeneratedApiKey {
        let key = format!("{}{}", self.prefix, secret);
        let hash = Self::hash_key(&key);

        GeneratedApiKey { key, hash }
    }

    /// Hash an API key for storage and lookup
    pub fn hash_key(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let result = hasher.finalize();
        format!("{}{}", HASH_SCHEME, URL_SAFE_NO_PAD.encode(result))
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}
