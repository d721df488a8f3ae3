//! Application state for shared services

use std::sync::Arc;

use axum::http::HeaderName;

use crate::domain::events::EventSearchBackend;
use crate::infrastructure::api_key::{ApiKeyService, RateGate};

/// Default request header carrying the API key
pub const DEFAULT_API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Application state shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub api_key_service: Arc<ApiKeyService>,
    pub rate_gate: RateGate,
    pub events: Arc<dyn EventSearchBackend>,
    /// Header the gate reads the key from
    pub api_key_header: HeaderName,
}

impl AppState {
    pub fn new(
        api_key_service: ApiKeyService,
        rate_gate: RateGate,
        events: Arc<dyn EventSearchBackend>,
    ) -> Self {
        Self {
            api_key_service: Arc::new(api_key_service),
            rate_gate,
            events,
            api_key_header: DEFAULT_API_KEY_HEADER,
        }
    }

    pub fn with_api_key_header(mut self, header: HeaderName) -> Self {
        self.api_key_header = header;
        self
    }
}
