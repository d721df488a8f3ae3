//! API key gate
//!
//! Two middlewares share the same key lookup:
//! - [`require_api_key`] authenticates the caller, then counts the request
//!   against the key's hourly ceiling
//! - [`authenticate_api_key`] authenticates only and counts nothing
//!
//! Both place the resolved [`ApiKey`] in the request extensions, where
//! handlers pick it up through [`RequireApiKey`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::RETRY_AFTER, request::Parts, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::{codes, ApiError};
use crate::domain::api_key::ApiKey;
use crate::infrastructure::api_key::Admission;
use crate::infrastructure::observability::{record_gate_decision, GateOutcome};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Reasons the gate turns a request away
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Missing, unknown and revoked keys are reported identically
    #[error("Invalid or missing API key")]
    AuthenticationFailed,

    #[error("Rate limit exceeded. Limit: {limit} requests/hour. Try again in {retry_after_secs} seconds.")]
    RateLimitExceeded { limit: u32, retry_after_secs: u64 },

    #[error("Service temporarily unavailable")]
    StoreUnavailable,
}

impl GateError {
    fn outcome(&self) -> GateOutcome {
        match self {
            Self::AuthenticationFailed => GateOutcome::Unauthenticated,
            Self::RateLimitExceeded { .. } => GateOutcome::Denied,
            Self::StoreUnavailable => GateOutcome::StoreError,
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        match self {
            Self::AuthenticationFailed => ApiError::unauthorized(message)
                .with_code(codes::AUTHENTICATION_FAILED)
                .into_response(),
            Self::RateLimitExceeded {
                limit,
                retry_after_secs,
            } => {
                let mut response = ApiError::rate_limited(message)
                    .with_code(codes::RATE_LIMIT_EXCEEDED)
                    .into_response();
                let headers = response.headers_mut();
                headers.insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
                set_quota_headers(headers, limit, 0);
                response
            }
            Self::StoreUnavailable => ApiError::store_unavailable().into_response(),
        }
    }
}

/// Extractor for the key resolved by the gate.
///
/// Only usable on routes behind [`require_api_key`] or
/// [`authenticate_api_key`]; elsewhere it rejects with
/// `AuthenticationFailed`.
#[derive(Debug, Clone)]
pub struct RequireApiKey(pub ApiKey);

impl<S: Send + Sync> FromRequestParts<S> for RequireApiKey {
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ApiKey>()
            .cloned()
            .map(RequireApiKey)
            .ok_or(GateError::AuthenticationFailed)
    }
}

/// Authenticate, then admit or deny against the hourly ceiling
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateError> {
    let key = resolve_key(&state, request.headers()).await.map_err(record)?;

    let admission = state
        .rate_gate
        .admit(&key, Utc::now())
        .await
        .map_err(|e| {
            warn!(key_id = %key.id(), error = %e, "Usage counter unavailable");
            record(GateError::StoreUnavailable)
        })?;

    match admission {
        Admission::Denied {
            limit,
            retry_after_secs,
        } => {
            debug!(key_id = %key.id(), limit, retry_after_secs, "Rate limit exceeded");
            Err(record(GateError::RateLimitExceeded {
                limit,
                retry_after_secs,
            }))
        }
        Admission::Admitted { limit, remaining } => {
            record_gate_decision(GateOutcome::Admitted);
            request.extensions_mut().insert(key);

            let mut response = next.run(request).await;
            set_quota_headers(response.headers_mut(), limit, remaining);
            Ok(response)
        }
    }
}

/// Authenticate without consuming quota
pub async fn authenticate_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateError> {
    let key = resolve_key(&state, request.headers()).await.map_err(record)?;
    request.extensions_mut().insert(key);

    Ok(next.run(request).await)
}

/// Write `X-RateLimit-Limit` and `X-RateLimit-Remaining`
pub fn set_quota_headers(headers: &mut HeaderMap, limit: u32, remaining: u32) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
}

fn record(error: GateError) -> GateError {
    record_gate_decision(error.outcome());
    error
}

async fn resolve_key(state: &AppState, headers: &HeaderMap) -> Result<ApiKey, GateError> {
    let secret = extract_api_key_from_headers(headers, &state.api_key_header)?;

    match state.api_key_service.verify(&secret).await {
        Ok(key) => Ok(key),
        Err(e) if e.is_not_found() => Err(GateError::AuthenticationFailed),
        Err(e) => {
            warn!(error = %e, "Key store unavailable");
            Err(GateError::StoreUnavailable)
        }
    }
}

fn extract_api_key_from_headers(
    headers: &HeaderMap,
    name: &HeaderName,
) -> Result<String, GateError> {
    let value = headers.get(name).ok_or(GateError::AuthenticationFailed)?;
    let key = value
        .to_str()
        .map_err(|_| GateError::AuthenticationFailed)?
        .trim();

    if key.is_empty() {
        return Err(GateError::AuthenticationFailed);
    }

    Ok(key.to_string())
}
