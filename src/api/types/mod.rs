//! API request, response and error types

pub mod error;
pub mod events;
pub mod json;

pub use error::{codes, ApiError, ApiErrorResponse, ApiErrorType};
pub use events::{EventSearchRequest, EventSearchResponse, KeyInfoResponse, ProvidersResponse};
pub use json::Json;
