//! Infrastructure layer - External service implementations

pub mod api_key;
pub mod events;
pub mod logging;
pub mod observability;
pub mod storage;
pub mod usage;
