//! Observability infrastructure - Metrics

mod config;
mod metrics;

pub use self::config::MetricsConfig;
pub use self::metrics::{
    create_metrics_router, init_metrics, record_gate_decision, record_http_request, GateOutcome,
    PrometheusMetrics,
};
