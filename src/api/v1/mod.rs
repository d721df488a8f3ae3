//! Public v1 API endpoints

pub mod events;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use super::middleware::{authenticate_api_key, require_api_key};
use super::state::AppState;

/// Create v1 API router.
///
/// Search counts against the caller's hourly ceiling; provider listing
/// and key-info only authenticate.
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    let metered = Router::new()
        .route("/events/search", post(events::search_events))
        .route_layer(from_fn_with_state(state.clone(), require_api_key));

    let authenticated = Router::new()
        .route("/events/providers", get(events::list_providers))
        .route("/events/key-info", get(events::key_info))
        .route_layer(from_fn_with_state(state, authenticate_api_key));

    metered.merge(authenticated)
}
