//! Redis-backed API key repository
//!
//! Each key is a Redis hash at `<prefix>:api_key:<key hash>`; the set at
//! `<prefix>:api_keys` indexes them for listing. Updates write single
//! fields, so a revocation and a ceiling change never clobber each other.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;

use crate::domain::api_key::{validate_rate_limit, ApiKey, ApiKeyId, ApiKeyRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::RedisStore;

const FIELD_ID: &str = "id";
const FIELD_NAME: &str = "name";
const FIELD_HASH: &str = "key_hash";
const FIELD_RATE_LIMIT: &str = "rate_limit_per_hour";
const FIELD_REVOKED: &str = "revoked";
const FIELD_CREATED_AT: &str = "created_at";
const FIELD_UPDATED_AT: &str = "updated_at";

/// Claims the record, writes every field and indexes it in one step.
/// KEYS: record, index. ARGV: key hash, then field/value pairs.
static CREATE_SCRIPT: LazyLock<redis::Script> = LazyLock::new(|| {
    redis::Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 1 then
            return 0
        end
        redis.call('HSET', KEYS[1], unpack(ARGV, 2))
        redis.call('SADD', KEYS[2], ARGV[1])
        return 1
        ",
    )
});

/// Redis implementation of ApiKeyRepository
#[derive(Debug, Clone)]
pub struct RedisApiKeyRepository {
    store: RedisStore,
}

impl RedisApiKeyRepository {
    pub fn new(store: RedisStore) -> Self {
        Self { store }
    }

    fn record_key(&self, key_hash: &str) -> String {
        self.store.prefix_key(&format!("api_key:{}", key_hash))
    }

    fn index_key(&self) -> String {
        self.store.prefix_key("api_keys")
    }

    async fn load(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError> {
        let mut conn = self.store.connection();

        let fields: HashMap<String, String> = conn
            .hgetall(self.record_key(key_hash))
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read API key: {}", e)))?;

        if fields.is_empty() {
            return Ok(None);
        }

        decode_record(&fields).map(Some)
    }

    async fn write_fields(
        &self,
        key_hash: &str,
        fields: &[(&str, String)],
    ) -> Result<(), DomainError> {
        let mut conn = self.store.connection();

        let _: () = conn
            .hset_multiple(self.record_key(key_hash), fields)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update API key: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ApiKeyRepository for RedisApiKeyRepository {
    async fn get_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError> {
        self.load(key_hash).await
    }

    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        let mut conn = self.store.connection();

        let mut invocation = CREATE_SCRIPT.key(self.record_key(api_key.key_hash()));
        invocation.key(self.index_key());
        for arg in create_args(&api_key) {
            invocation.arg(arg);
        }

        let created: i32 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create API key: {}", e)))?;

        if created == 0 {
            return Err(DomainError::conflict(format!(
                "API key '{}' already exists",
                api_key.id()
            )));
        }

        Ok(api_key)
    }

    async fn revoke(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError> {
        let Some(mut key) = self.load(key_hash).await? else {
            return Ok(None);
        };

        if key.is_revoked() {
            return Ok(Some(key));
        }

        key.revoke();
        self.write_fields(
            key_hash,
            &[
                (FIELD_REVOKED, "1".to_string()),
                (FIELD_UPDATED_AT, key.updated_at().to_rfc3339()),
            ],
        )
        .await?;

        Ok(Some(key))
    }

    async fn set_rate_limit(
        &self,
        key_hash: &str,
        requests_per_hour: u32,
    ) -> Result<Option<ApiKey>, DomainError> {
        validate_rate_limit(requests_per_hour)?;

        let Some(mut key) = self.load(key_hash).await? else {
            return Ok(None);
        };

        key.set_rate_limit(requests_per_hour)?;
        self.write_fields(
            key_hash,
            &[
                (FIELD_RATE_LIMIT, requests_per_hour.to_string()),
                (FIELD_UPDATED_AT, key.updated_at().to_rfc3339()),
            ],
        )
        .await?;

        Ok(Some(key))
    }

    async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        let mut conn = self.store.connection();

        let hashes: Vec<String> = conn
            .smembers(self.index_key())
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        let mut keys = Vec::with_capacity(hashes.len());

        for hash in hashes {
            if let Some(key) = self.load(&hash).await? {
                keys.push(key);
            }
        }

        keys.sort_by_key(|k| k.created_at());
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.store.ping().await
    }
}

fn encode_record(key: &ApiKey) -> Vec<(&'static str, String)> {
    vec![
        (FIELD_ID, key.id().to_string()),
        (FIELD_NAME, key.name().to_string()),
        (FIELD_HASH, key.key_hash().to_string()),
        (FIELD_RATE_LIMIT, key.rate_limit_per_hour().to_string()),
        (FIELD_REVOKED, if key.is_revoked() { "1" } else { "0" }.to_string()),
        (FIELD_CREATED_AT, key.created_at().to_rfc3339()),
        (FIELD_UPDATED_AT, key.updated_at().to_rfc3339()),
    ]
}

/// `ARGV` for the create script
fn create_args(key: &ApiKey) -> Vec<String> {
    let mut args = vec![key.key_hash().to_string()];
    for (field, value) in encode_record(key) {
        args.push(field.to_string());
        args.push(value);
    }
    args
}

fn decode_record(fields: &HashMap<String, String>) -> Result<ApiKey, DomainError> {
    let field = |name: &str| {
        fields
            .get(name)
            .ok_or_else(|| DomainError::storage(format!("API key record is missing '{}'", name)))
    };

    let timestamp = |name: &str| -> Result<DateTime<Utc>, DomainError> {
        DateTime::parse_from_rfc3339(field(name)?)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DomainError::storage(format!("Invalid '{}' in API key record: {}", name, e)))
    };

    let id = ApiKeyId::new(field(FIELD_ID)?.clone())
        .map_err(|e| DomainError::storage(format!("Invalid id in API key record: {}", e)))?;

    let rate_limit = field(FIELD_RATE_LIMIT)?
        .parse::<u32>()
        .map_err(|e| DomainError::storage(format!("Invalid rate limit in API key record: {}", e)))?;

    Ok(ApiKey::restore(
        id,
        field(FIELD_NAME)?.clone(),
        field(FIELD_HASH)?.clone(),
        rate_limit,
        field(FIELD_REVOKED)? == "1",
        timestamp(FIELD_CREATED_AT)?,
        timestamp(FIELD_UPDATED_AT)?,
    ))
}
