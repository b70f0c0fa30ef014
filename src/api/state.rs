//! Application state for shared services

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::infrastructure::observability::PrometheusMetrics;
use crate::infrastructure::services::RagBotService;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<RagBotService>,
    /// SHA-256 of the admin token; `None` disables admin commands
    admin_token_digest: Option<[u8; 32]>,
    pub metrics: Option<PrometheusMetrics>,
}

impl AppState {
    pub fn new(bot: Arc<RagBotService>) -> Self {
        Self {
            bot,
            admin_token_digest: None,
            metrics: None,
        }
    }

    pub fn with_admin_token(mut self, token: Option<&str>) -> Self {
        self.admin_token_digest = token
            .filter(|t| !t.is_empty())
            .map(digest);
        self
    }

    pub fn with_metrics(mut self, metrics: Option<PrometheusMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn admin_enabled(&self) -> bool {
        self.admin_token_digest.is_some()
    }

    /// Compare a presented token with the configured one in constant time
    pub fn verify_admin_token(&self, presented: &str) -> bool {
        let Some(expected) = self.admin_token_digest else {
            return false;
        };

        digest(presented)
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

fn digest(token: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(token.as_bytes()));
    out
}
