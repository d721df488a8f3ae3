//! Event search backends

mod catalog;
mod http;

pub use catalog::InMemoryEventCatalog;
pub use http::{HttpEventSearchBackend, DEFAULT_UPSTREAM_TIMEOUT};
