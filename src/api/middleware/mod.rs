//! API middleware components

pub mod auth;
pub mod metrics;

pub use auth::{
    authenticate_api_key, require_api_key, set_quota_headers, GateError, RequireApiKey,
    X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING,
};
pub use self::metrics::metrics_middleware;
