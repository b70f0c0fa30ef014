//! Document source trait

use async_trait::async_trait;

use super::SourceDocument;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Where the knowledge base text comes from (built-in list, crawled site)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Load every document of this source
    async fn load(&self) -> Result<Vec<SourceDocument>, DomainError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
