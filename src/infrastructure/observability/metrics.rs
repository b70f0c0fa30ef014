//! Prometheus metrics for questions and knowledge-base refreshes

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("rag_bot_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

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

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Result of handling one question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionOutcome {
    Answered,
    NotReady,
    Invalid,
    Failed,
}

impl QuestionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answered => "answered",
            Self::NotReady => "not_ready",
            Self::Invalid => "invalid",
            Self::Failed => "failed",
        }
    }
}

/// Record a handled question
pub fn record_question(outcome: QuestionOutcome, duration: Duration) {
    counter!("rag_questions_total", "outcome" => outcome.as_str()).increment(1);

    if outcome == QuestionOutcome::Answered {
        histogram!("rag_question_duration_seconds").record(duration.as_secs_f64());
    }
}

/// Record a knowledge-base refresh; `chunks` is set on success
pub fn record_refresh(chunks: Option<usize>) {
    match chunks {
        Some(count) => {
            counter!("rag_refresh_total", "outcome" => "success").increment(1);
            gauge!("rag_indexed_chunks").set(count as f64);
        }
        None => {
            counter!("rag_refresh_total", "outcome" => "failed").increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(QuestionOutcome::Answered.as_str(), "answered");
        assert_eq!(QuestionOutcome::NotReady.as_str(), "not_ready");
        assert_eq!(QuestionOutcome::Invalid.as_str(), "invalid");
        assert_eq!(QuestionOutcome::Failed.as_str(), "failed");
    }

    #[test]
    fn test_disabled_metrics_not_installed() {
        let config = MetricsConfig {
            enabled: false,
            path: "/metrics".to_string(),
        };

        assert!(init_metrics(&config).is_none());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_question(QuestionOutcome::Answered, Duration::from_millis(5));
        record_refresh(Some(4));
        record_refresh(None);
    }
}
