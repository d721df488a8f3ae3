//! Keys command - manage API keys in the configured store

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use clap::{Args, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::api_key::ApiKeyService;
use crate::infrastructure::storage::{StorageConfig, StorageFactory, StorageType};

#[derive(Args)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[derive(Subcommand)]
pub enum KeysCommand {
    /// Create a key and print it once
    Create {
        /// Descriptive name for the key
        name: String,
        /// Requests allowed per hour (defaults to the configured ceiling)
        #[arg(long)]
        rate_limit: Option<u32>,
    },

    /// Revoke a key
    Revoke {
        /// The plaintext key
        key: String,
    },

    /// Change the hourly ceiling of a key
    SetLimit {
        /// The plaintext key
        key: String,
        requests_per_hour: u32,
    },

    /// List all keys
    List,
}

/// Run a keys subcommand against the configured store
pub async fn run(args: KeysArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    run_from("config", args).await
}

async fn run_from(config_dir: impl AsRef<Path>, args: KeysArgs) -> anyhow::Result<()> {
    let config = AppConfig::load_from(config_dir).context("Failed to load configuration")?;
    super::serve::init_logging(&config);

    let storage_config = shared_storage_config(&config)?;
    let storage = StorageFactory::create(&storage_config).await?;
    let service = crate::create_api_key_service(&config, storage.api_keys);

    execute(&service, &config.api_keys.header, args.command, &mut std::io::stdout()).await
}

/// Keys written to a process-local store would vanish when the command exits
fn shared_storage_config(config: &AppConfig) -> anyhow::Result<StorageConfig> {
    let storage_config = config.storage.storage_config()?;

    if storage_config.storage_type() == StorageType::InMemory {
        bail!(
            "The keys command needs the shared key store: set storage.backend = \"redis\" \
             and storage.redis_url (or APP__STORAGE__BACKEND and APP__STORAGE__REDIS_URL)"
        );
    }

    Ok(storage_config)
}

async fn execute(
    service: &ApiKeyService,
    header: &str,
    command: KeysCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        KeysCommand::Create { name, rate_limit } => {
            let created = service.create(&name, rate_limit).await?;
            let key = &created.secret;
            let rule = "=".repeat(60);

            writeln!(out, "Created API key for: {}", created.api_key.name())?;
            writeln!(out, "Rate limit: {} requests/hour", created.api_key.rate_limit_per_hour())?;
            writeln!(out, "{}", rule)?;
            writeln!(out, "API Key: {}", key)?;
            writeln!(out)?;
            writeln!(out, "Save this key now. It will not be shown again.")?;
            writeln!(out)?;
            writeln!(out, "Usage:")?;
            writeln!(out, "  curl -H \"{}: {}\" \\", header, key)?;
            writeln!(out, "       -H \"Content-Type: application/json\" \\")?;
            writeln!(out, "       -d '{{\"city\": \"San Francisco\", \"max_pages\": 3}}' \\")?;
            writeln!(out, "       https://your-domain.com/api/v1/events/search")?;
            writeln!(out, "{}", rule)?;
        }
        KeysCommand::Revoke { key } => {
            let revoked = service
                .revoke(&key)
                .await
                .with_context(|| format!("Failed to revoke {}", redact(&key)))?;
            writeln!(out, "API key revoked: {} ({})", revoked.name(), revoked.id())?;
        }
        KeysCommand::SetLimit {
            key,
            requests_per_hour,
        } => {
            let updated = service
                .set_rate_limit(&key, requests_per_hour)
                .await
                .with_context(|| format!("Failed to update {}", redact(&key)))?;
            writeln!(
                out,
                "Rate limit for {} ({}) is now {} requests/hour",
                updated.name(),
                updated.id(),
                updated.rate_limit_per_hour()
            )?;
        }
        KeysCommand::List => {
            let keys = service.list().await?;

            if keys.is_empty() {
                writeln!(out, "No API keys")?;
            }

            for key in keys {
                writeln!(
                    out,
                    "{}\t{}\t{}/h\t{}\t{}",
                    key.id(),
                    key.name(),
                    key.rate_limit_per_hour(),
                    if key.is_revoked() { "revoked" } else { "active" },
                    key.created_at().to_rfc3339()
                )?;
            }
        }
    }

    Ok(())
}

/// First characters of a key, enough to recognise it in messages
fn redact(key: &str) -> String {
    let visible: String = key.chars().take(10).collect();
    format!("{}...", visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::infrastructure::api_key::InMemoryApiKeyRepository;

    fn create_service() -> ApiKeyService {
        ApiKeyService::new(Arc::new(InMemoryApiKeyRepository::new()))
    }

    async fn run_command(service: &ApiKeyService, command: KeysCommand) -> anyhow::Result<String> {
        let mut out = Vec::new();
        execute(service, "X-API-Key", command, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn printed_key(output: &str) -> String {
        output
            .lines()
            .find_map(|line| line.strip_prefix("API Key: "))
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_create_prints_key_and_usage() {
        let service = create_service();

        let output = run_command(
            &service,
            KeysCommand::Create {
                name: "Partner App".to_string(),
                rate_limit: Some(250),
            },
        )
        .await
        .unwrap();

        let key = printed_key(&output);
        assert!(key.starts_with("loco_"));
        assert!(output.contains("Rate limit: 250 requests/hour"));
        assert!(output.contains(&format!("X-API-Key: {}", key)));
        assert!(output.contains("/api/v1/events/search"));

        assert!(service.verify(&key).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoke() {
        let service = create_service();
        let created = service.create("Partner App", None).await.unwrap();

        let output = run_command(
            &service,
            KeysCommand::Revoke {
                key: created.secret.clone(),
            },
        )
        .await
        .unwrap();

        assert!(output.contains("revoked"));
        assert!(service.verify(&created.secret).await.is_err());
    }

    #[tokio::test]
    async fn test_revoke_unknown_key_fails() {
        let service = create_service();

        let err = run_command(
            &service,
            KeysCommand::Revoke {
                key: "loco_doesnotexist".to_string(),
            },
        )
        .await
        .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("loco_doesn..."));
        assert!(!message.contains("loco_doesnotexist"));
    }

    #[tokio::test]
    async fn test_set_limit() {
        let service = create_service();
        let created = service.create("Partner App", Some(10)).await.unwrap();

        let output = run_command(
            &service,
            KeysCommand::SetLimit {
                key: created.secret.clone(),
                requests_per_hour: 40,
            },
        )
        .await
        .unwrap();

        assert!(output.contains("now 40 requests/hour"));
        assert_eq!(
            service.verify(&created.secret).await.unwrap().rate_limit_per_hour(),
            40
        );
    }

    #[tokio::test]
    async fn test_list() {
        let service = create_service();
        assert!(run_command(&service, KeysCommand::List)
            .await
            .unwrap()
            .contains("No API keys"));

        service.create("First", None).await.unwrap();
        let second = service.create("Second", Some(5)).await.unwrap();
        service.revoke(&second.secret).await.unwrap();

        let output = run_command(&service, KeysCommand::List).await.unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().any(|l| l.contains("First") && l.contains("active")));
        assert!(lines.iter().any(|l| l.contains("Second") && l.contains("5/h") && l.contains("revoked")));
        assert!(!output.contains(&second.secret));
    }

    #[tokio::test]
    async fn test_run_refuses_in_memory_store() {
        let err = run(KeysArgs {
            command: KeysCommand::Create {
                name: "Partner App".to_string(),
                rate_limit: None,
            },
        })
        .await
        .unwrap_err();

        assert!(err.to_string().contains("storage.backend"));
    }

    #[tokio::test]
    async fn test_run_refuses_default_config() {
        let dir = tempfile::tempdir().unwrap();

        let err = run_from(dir.path(), KeysArgs { command: KeysCommand::List })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("shared key store"));
    }

    #[test]
    fn test_shared_storage_config() {
        assert!(shared_storage_config(&AppConfig::default()).is_err());

        let mut config = AppConfig::default();
        config.storage.backend = "redis".to_string();
        config.storage.redis_url = Some("redis://localhost:6379".to_string());

        assert_eq!(
            shared_storage_config(&config).unwrap().storage_type(),
            StorageType::Redis
        );
    }

    #[tokio::test]
    async fn test_run_reports_malformed_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("local.toml"), "[storage]\nusage_retention_secs = \"soon\"\n").unwrap();

        let err = run_from(dir.path(), KeysArgs { command: KeysCommand::List })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to load configuration");
    }
}
