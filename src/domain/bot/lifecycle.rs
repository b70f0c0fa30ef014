//! Two-state pipeline lifecycle: uninitialized until the first successful build

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::rag::RagPipeline;

/// Lifecycle of the retrieval pipeline held by the bot
#[derive(Debug, Clone, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Ready {
        pipeline: Arc<RagPipeline>,
        /// Incremented on every successful build, starting at 1
        generation: u64,
        ready_since: DateTime<Utc>,
    },
}

impl Lifecycle {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Snapshot of the current pipeline, if any
    pub fn pipeline(&self) -> Option<Arc<RagPipeline>> {
        match self {
            Self::Uninitialized => None,
            Self::Ready { pipeline, .. } => Some(Arc::clone(pipeline)),
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            Self::Uninitialized => 0,
            Self::Ready { generation, .. } => *generation,
        }
    }

    /// Next state after a successful build
    pub fn advance(&self, pipeline: RagPipeline) -> Self {
        Self::Ready {
            pipeline: Arc::new(pipeline),
            generation: self.generation() + 1,
            ready_since: Utc::now(),
        }
    }

    pub fn status(&self) -> LifecycleStatus {
        match self {
            Self::Uninitialized => LifecycleStatus {
                state: "uninitialized",
                generation: 0,
                ready_since: None,
                chunk_count: None,
                backend: None,
            },
            Self::Ready {
                pipeline,
                generation,
                ready_since,
            } => LifecycleStatus {
                state: "ready",
                generation: *generation,
                ready_since: Some(*ready_since),
                chunk_count: Some(pipeline.chunk_count()),
                backend: Some(pipeline.backend_name()),
            },
        }
    }
}

/// Serializable view of the lifecycle for probes
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleStatus {
    pub state: &'static str,
    pub generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_since: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<&'static str>,
}
