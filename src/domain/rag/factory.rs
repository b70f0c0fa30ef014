//! Factory seam for building a fresh, indexed pipeline

use async_trait::async_trait;

use super::RagPipeline;
use crate::domain::DomainError;

/// Builds a complete, indexed pipeline from scratch
///
/// Each call loads the documents, indexes them and returns a pipeline that
/// is ready to answer. Nothing is shared with previously built pipelines
/// except remote stores.
#[async_trait]
pub trait PipelineFactory: Send + Sync {
    async fn build(&self) -> Result<RagPipeline, DomainError>;
}
