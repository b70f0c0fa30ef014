//! Built-in document list

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::knowledge_base::{DocumentSource, SourceDocument};

/// Company description used when no other source is configured
pub const DEFAULT_TEXTS: [&str; 4] = [
    "LFG offers services in web development.",
    "LFG provides solutions for cloud computing.",
    "LFG specializes in AI and Machine Learning applications.",
    "Contact LFG for a consultation on your next project.",
];

/// Fixed list of texts, labelled `dummy_doc_<index>`
#[derive(Debug, Clone)]
pub struct StaticSource {
    texts: Vec<String>,
}

impl StaticSource {
    pub fn new(texts: Vec<String>) -> Self {
        Self { texts }
    }

    pub fn label(index: usize) -> String {
        format!("dummy_doc_{}", index)
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new(DEFAULT_TEXTS.iter().map(|t| t.to_string()).collect())
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn load(&self) -> Result<Vec<SourceDocument>, DomainError> {
        Ok(self
            .texts
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| SourceDocument::new(text.clone(), Self::label(i)))
            .collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
