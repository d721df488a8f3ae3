use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, middleware::from_fn, routing::get, BoxError, Router};
use tower::timeout::error::Elapsed;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::error;

use super::health;
use super::middleware::metrics_middleware;
use super::state::AppState;
use super::types::ApiError;
use super::v1;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Public event API behind the key gate
        .nest("/api/v1", v1::create_v1_router(state.clone()))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .timeout(request_timeout),
        )
        .layer(TraceLayer::new_for_http())
}

async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        return ApiError::request_timeout();
    }

    error!(error = %err, "Unhandled middleware error");
    ApiError::internal("Internal server error")
}
