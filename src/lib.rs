//! Local Life Gateway
//!
//! API key authentication and hourly rate limiting in front of the
//! Local Life Assistant event-search API:
//! - Reveal-once keys stored as SHA-256 digests
//! - Fixed one-hour windows counted in a shared store (Redis or in-memory)
//! - Event search forwarded to an upstream service or a built-in catalogue

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use axum::http::HeaderName;
use tracing::info;

use api::state::AppState;
use config::EventsConfig;
use domain::api_key::ApiKeyRepository;
use domain::events::EventSearchBackend;
use infrastructure::{
    api_key::{ApiKeyGenerator, ApiKeyService, RateGate},
    events::{HttpEventSearchBackend, InMemoryEventCatalog},
    storage::StorageFactory,
};

/// Create the application state from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage = StorageFactory::create(&config.storage.storage_config()?).await?;

    let api_key_service = create_api_key_service(config, storage.api_keys);
    let rate_gate = RateGate::new(storage.usage);
    let events = create_events_backend(&config.events)?;
    let header = HeaderName::try_from(config.api_keys.header.as_str())?;

    Ok(AppState::new(api_key_service, rate_gate, events).with_api_key_header(header))
}

/// Key service over `repository` with the configured prefix and default ceiling
pub fn create_api_key_service(
    config: &AppConfig,
    repository: Arc<dyn ApiKeyRepository>,
) -> ApiKeyService {
    ApiKeyService::new(repository)
        .with_generator(ApiKeyGenerator::new(config.api_keys.prefix.clone()))
        .with_default_rate_limit(config.api_keys.default_rate_limit)
}

fn create_events_backend(config: &EventsConfig) -> anyhow::Result<Arc<dyn EventSearchBackend>> {
    match &config.upstream_url {
        Some(url) => {
            info!(upstream = %url, "Using upstream event service");
            Ok(Arc::new(HttpEventSearchBackend::new(url, config.timeout())?))
        }
        None => {
            info!("Using built-in event catalogue");
            Ok(Arc::new(InMemoryEventCatalog::with_sample_events()))
        }
    }
}
