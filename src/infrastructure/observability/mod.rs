//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    PrometheusMetrics, QuestionOutcome, create_metrics_router, init_metrics, record_question,
    record_refresh,
};
