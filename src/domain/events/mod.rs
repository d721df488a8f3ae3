//! Event search domain
//!
//! The gateway does not find events itself. Searches are handed to an
//! [`EventSearchBackend`] once a request has been admitted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

pub const DEFAULT_MAX_PAGES: u32 = 3;
pub const MAX_PAGES_LIMIT: u32 = 10;
pub const MAX_RESULTS_LIMIT: u32 = 100;

/// Cities the event providers cover
pub const SUPPORTED_CITIES: &[&str] = &[
    "San Francisco",
    "New York",
    "Los Angeles",
    "Miami",
    "Chicago",
    "Seattle",
    "Boston",
];

/// A validated event search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSearchQuery {
    pub city: String,
    pub max_pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
}

impl EventSearchQuery {
    /// Build a query, checking the paging bounds
    pub fn new(
        city: impl Into<String>,
        max_pages: Option<u32>,
        max_results: Option<u32>,
        providers: Option<Vec<String>>,
    ) -> Result<Self, DomainError> {
        let city = city.into().trim().to_string();

        if city.is_empty() {
            return Err(DomainError::validation("city must not be empty"));
        }

        let max_pages = max_pages.unwrap_or(DEFAULT_MAX_PAGES);
        if !(1..=MAX_PAGES_LIMIT).contains(&max_pages) {
            return Err(DomainError::validation(format!(
                "max_pages must be between 1 and {}",
                MAX_PAGES_LIMIT
            )));
        }

        if let Some(max_results) = max_results {
            if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
                return Err(DomainError::validation(format!(
                    "max_results must be between 1 and {}",
                    MAX_RESULTS_LIMIT
                )));
            }
        }

        let providers = providers.filter(|p| !p.is_empty());

        Ok(Self {
            city,
            max_pages,
            max_results,
            providers,
        })
    }
}

/// Events returned by a backend. Event payloads are passed through as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSearchResult {
    pub events: Vec<serde_json::Value>,
    pub providers_used: Vec<String>,
}

/// An event provider known to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub supported_cities: Vec<String>,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supported_cities: SUPPORTED_CITIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Event search collaborator invoked after admission
#[async_trait]
pub trait EventSearchBackend: Send + Sync + Debug {
    async fn search(&self, query: &EventSearchQuery) -> Result<EventSearchResult, DomainError>;

    async fn providers(&self) -> Result<Vec<ProviderInfo>, DomainError>;
}
