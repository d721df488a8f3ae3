//! In-memory event catalogue
//!
//! Serves a fixed set of events per provider and city. Used when no
//! upstream event service is configured and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::domain::events::{
    EventSearchBackend, EventSearchQuery, EventSearchResult, ProviderInfo, SUPPORTED_CITIES,
};
use crate::domain::DomainError;

/// Events offered by a single provider, grouped by city
#[derive(Debug, Clone, Default)]
struct ProviderEvents {
    name: String,
    by_city: HashMap<String, Vec<Value>>,
}

/// In-memory [`EventSearchBackend`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventCatalog {
    providers: Vec<ProviderEvents>,
}

impl InMemoryEventCatalog {
    /// Create an empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Registering the same name twice is a no-op.
    pub fn with_provider(mut self, name: impl Into<String>) -> Self {
        let name = name.into();

        if !self.providers.iter().any(|p| p.name.eq_ignore_ascii_case(&name)) {
            self.providers.push(ProviderEvents {
                name,
                by_city: HashMap::new(),
            });
        }

        self
    }

    /// Add an event for `city` to a provider, registering the provider if needed
    pub fn with_event(mut self, provider: &str, city: &str, event: Value) -> Self {
        self = self.with_provider(provider);

        if let Some(entry) = self
            .providers
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(provider))
        {
            entry
                .by_city
                .entry(city.to_lowercase())
                .or_default()
                .push(event);
        }

        self
    }

    /// Catalogue with one sample event per supported city
    pub fn with_sample_events() -> Self {
        SUPPORTED_CITIES.iter().fold(Self::new(), |catalog, city| {
            catalog.with_event(
                "eventbrite",
                city,
                json!({
                    "title": format!("{} Community Meetup", city),
                    "city": city,
                    "source": "eventbrite",
                }),
            )
        })
    }

    fn selected<'a>(&'a self, names: Option<&'a [String]>) -> impl Iterator<Item = &'a ProviderEvents> {
        self.providers.iter().filter(move |provider| match names {
            None => true,
            Some(names) => names.iter().any(|n| n.eq_ignore_ascii_case(&provider.name)),
        })
    }
}

fn supports_city(city: &str) -> bool {
    SUPPORTED_CITIES.iter().any(|c| c.eq_ignore_ascii_case(city))
}

#[async_trait]
impl EventSearchBackend for InMemoryEventCatalog {
    async fn search(&self, query: &EventSearchQuery) -> Result<EventSearchResult, DomainError> {
        let mut events = Vec::new();

        if supports_city(&query.city) {
            let city = query.city.to_lowercase();

            for provider in self.selected(query.providers.as_deref()) {
                let Some(found) = provider.by_city.get(&city) else {
                    continue;
                };

                let take = query.max_results.map_or(found.len(), |n| n as usize);
                events.extend(found.iter().take(take).cloned());
            }
        } else {
            debug!(city = %query.city, "No provider supports city");
        }

        let providers_used = match &query.providers {
            Some(names) => names.clone(),
            None => self.providers.iter().map(|p| p.name.clone()).collect(),
        };

        Ok(EventSearchResult {
            events,
            providers_used,
        })
    }

    async fn providers(&self) -> Result<Vec<ProviderInfo>, DomainError> {
        Ok(self
            .providers
            .iter()
            .map(|p| ProviderInfo::new(p.name.clone()))
            .collect())
    }
}
