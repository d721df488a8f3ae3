//! Upstream event service client
//!
//! Forwards admitted searches to an event service over HTTP:
//! - `POST {base}/search` with the query as JSON
//! - `GET {base}/providers`

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::domain::events::{EventSearchBackend, EventSearchQuery, EventSearchResult, ProviderInfo};
use crate::domain::DomainError;

const SERVICE: &str = "events";

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Deserialize)]
struct ProvidersResponse {
    providers: Vec<ProviderInfo>,
}

/// [`EventSearchBackend`] backed by a remote event service
#[derive(Debug, Clone)]
pub struct HttpEventSearchBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEventSearchBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DomainError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::upstream(SERVICE, format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::upstream(SERVICE, format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl EventSearchBackend for HttpEventSearchBackend {
    async fn search(&self, query: &EventSearchQuery) -> Result<EventSearchResult, DomainError> {
        debug!(city = %query.city, max_pages = query.max_pages, "Forwarding event search");

        let response = self
            .client
            .post(self.url("/search"))
            .json(query)
            .send()
            .await
            .map_err(|e| DomainError::upstream(SERVICE, format!("Request failed: {}", e)))?;

        Self::read_json(response).await
    }

    async fn providers(&self) -> Result<Vec<ProviderInfo>, DomainError> {
        let response = self
            .client
            .get(self.url("/providers"))
            .send()
            .await
            .map_err(|e| DomainError::upstream(SERVICE, format!("Request failed: {}", e)))?;

        let body: ProvidersResponse = Self::read_json(response).await?;
        Ok(body.providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_backend(server: &MockServer) -> HttpEventSearchBackend {
        HttpEventSearchBackend::new(format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_search_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_json(json!({"city": "Seattle", "max_pages": 2, "max_results": 10})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "events": [{"title": "Pike Place Tour"}],
                "providers_used": ["eventbrite"]
            })))
            .mount(&server)
            .await;

        let backend = create_backend(&server);
        let query = EventSearchQuery::new("Seattle", Some(2), Some(10), None).unwrap();

        let result = backend.search(&query).await.unwrap();
        assert_eq!(result.events, vec![json!({"title": "Pike Place Tour"})]);
        assert_eq!(result.providers_used, vec!["eventbrite"]);
    }

    #[tokio::test]
    async fn test_search_upstream_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = create_backend(&server);
        let query = EventSearchQuery::new("Seattle", None, None, None).unwrap();

        match backend.search(&query).await {
            Err(DomainError::Upstream { service, message }) => {
                assert_eq!(service, "events");
                assert!(message.contains("500"));
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_malformed_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let backend = create_backend(&server);
        let query = EventSearchQuery::new("Seattle", None, None, None).unwrap();

        assert!(matches!(
            backend.search(&query).await,
            Err(DomainError::Upstream { .. })
        ));
    }

    #[tokio::test]
    async fn test_providers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/providers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "providers": [{"name": "eventbrite", "supported_cities": ["Boston"]}]
            })))
            .mount(&server)
            .await;

        let backend = create_backend(&server);

        let providers = backend.providers().await.unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name, "eventbrite");
        assert_eq!(providers[0].supported_cities, vec!["Boston"]);
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let backend =
            HttpEventSearchBackend::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();

        assert!(matches!(
            backend.providers().await,
            Err(DomainError::Upstream { .. })
        ));
    }
}
