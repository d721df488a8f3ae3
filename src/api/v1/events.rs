//! Event search endpoints

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::info;

use crate::api::middleware::{set_quota_headers, RequireApiKey};
use crate::api::state::AppState;
use crate::api::types::{
    ApiError, EventSearchRequest, EventSearchResponse, Json, KeyInfoResponse, ProvidersResponse,
};
use crate::domain::events::EventSearchQuery;

/// POST /api/v1/events/search
pub async fn search_events(
    State(state): State<AppState>,
    RequireApiKey(key): RequireApiKey,
    Json(request): Json<EventSearchRequest>,
) -> Result<Json<EventSearchResponse>, ApiError> {
    let query = EventSearchQuery::new(
        request.city,
        request.max_pages,
        request.max_results,
        request.providers,
    )?;

    info!(
        key_id = %key.id(),
        city = %query.city,
        max_pages = query.max_pages,
        max_results = ?query.max_results,
        providers = ?query.providers,
        "Event search"
    );

    let result = state.events.search(&query).await?;

    Ok(Json(EventSearchResponse {
        success: true,
        city: query.city,
        total_events: result.events.len(),
        events: result.events,
        providers_used: result.providers_used,
    }))
}

/// GET /api/v1/events/providers
pub async fn list_providers(
    State(state): State<AppState>,
) -> Result<Json<ProvidersResponse>, ApiError> {
    let providers = state.events.providers().await?;

    Ok(Json(ProvidersResponse {
        success: true,
        providers,
    }))
}

/// GET /api/v1/events/key-info
///
/// Reports the caller's ceiling and what is left of the current hour
/// without counting this request.
pub async fn key_info(
    State(state): State<AppState>,
    RequireApiKey(key): RequireApiKey,
) -> Result<Response, ApiError> {
    let usage = state.rate_gate.usage(&key, Utc::now()).await?;

    let mut response = Json(KeyInfoResponse {
        name: key.name().to_string(),
        rate_limit_per_hour: usage.limit,
        requests_remaining: usage.remaining,
    })
    .into_response();

    set_quota_headers(response.headers_mut(), usage.limit, usage.remaining);
    Ok(response)
}
