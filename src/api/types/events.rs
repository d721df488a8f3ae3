//! Event search request and response bodies

use serde::{Deserialize, Serialize};

use crate::domain::events::ProviderInfo;

/// Body of `POST /api/v1/events/search`
#[derive(Debug, Clone, Deserialize)]
pub struct EventSearchRequest {
    pub city: String,
    #[serde(default)]
    pub max_pages: Option<u32>,
    #[serde(default)]
    pub max_results: Option<u32>,
    #[serde(default)]
    pub providers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSearchResponse {
    pub success: bool,
    pub city: String,
    pub total_events: usize,
    pub events: Vec<serde_json::Value>,
    pub providers_used: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersResponse {
    pub success: bool,
    pub providers: Vec<ProviderInfo>,
}

/// Body of `GET /api/v1/events/key-info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyInfoResponse {
    pub name: String,
    pub rate_limit_per_hour: u32,
    pub requests_remaining: u32,
}
