//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Outcome of the authentication and rate gate for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Admitted,
    Denied,
    Unauthenticated,
    StoreError,
}

impl GateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admitted => "admitted",
            Self::Denied => "denied",
            Self::Unauthenticated => "unauthenticated",
            Self::StoreError => "store_error",
        }
    }
}

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the Prometheus recorder. Returns `None` when disabled or when
/// a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("local_life_gateway_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router serving `path`
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record one gate decision
pub fn record_gate_decision(outcome: GateOutcome) {
    counter!("gate_decisions_total", "outcome" => outcome.as_str()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_outcome_labels() {
        assert_eq!(GateOutcome::Admitted.as_str(), "admitted");
        assert_eq!(GateOutcome::Denied.as_str(), "denied");
        assert_eq!(GateOutcome::Unauthenticated.as_str(), "unauthenticated");
        assert_eq!(GateOutcome::StoreError.as_str(), "store_error");
    }

    #[test]
    fn test_disabled_metrics() {
        let config = MetricsConfig {
            enabled: false,
            path: "/metrics".to_string(),
        };
        assert!(init_metrics(&config).is_none());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_gate_decision(GateOutcome::Denied);
        record_http_request("GET", "/health", 200, Duration::from_millis(3));
    }
}
