//! Web page source with same-host crawling

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use reqwest::Url;

use crate::domain::DomainError;
use crate::domain::knowledge_base::{DocumentSource, SourceDocument};
use crate::infrastructure::http_client::HttpClientTrait;
use crate::infrastructure::ingestion::extract_page;

/// Loads pages over HTTP and extracts their visible text
///
/// Starting from the configured URLs, links on the same host are followed
/// breadth-first until `max_pages` pages have been fetched. With
/// `follow_links` off only the start URLs are loaded.
#[derive(Debug)]
pub struct WebSource<C: HttpClientTrait> {
    client: C,
    start_urls: Vec<String>,
    max_pages: usize,
    follow_links: bool,
}

impl<C: HttpClientTrait> WebSource<C> {
    pub fn new(client: C, start_urls: Vec<String>) -> Self {
        Self {
            client,
            start_urls,
            max_pages: 20,
            follow_links: false,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    fn seed(&self) -> Result<VecDeque<Url>, DomainError> {
        let mut queue = VecDeque::new();
        for raw in &self.start_urls {
            let url = Url::parse(raw)
                .map_err(|e| DomainError::source(format!("Invalid URL '{}': {}", raw, e)))?;
            queue.push_back(url);
        }
        Ok(queue)
    }
}

#[async_trait]
impl<C: HttpClientTrait> DocumentSource for WebSource<C> {
    async fn load(&self) -> Result<Vec<SourceDocument>, DomainError> {
        let mut queue = self.seed()?;
        if queue.is_empty() {
            return Err(DomainError::source("No URLs configured for the web source"));
        }

        let allowed_hosts: HashSet<String> = queue
            .iter()
            .filter_map(|u| u.host_str().map(str::to_string))
            .collect();
        let mut seen: HashSet<Url> = queue.iter().cloned().collect();
        let mut documents = Vec::new();
        let mut fetched = 0usize;
        let mut last_error: Option<DomainError> = None;

        while let Some(url) = queue.pop_front() {
            if fetched >= self.max_pages {
                break;
            }
            fetched += 1;

            let body = match self.client.get_text(url.as_str(), vec![("Accept", "text/html")]).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Failed to fetch page, skipping");
                    last_error = Some(e);
                    continue;
                }
            };

            let page = extract_page(&body, &url);
            tracing::debug!(url = %url, chars = page.text.len(), links = page.links.len(), "Fetched page");

            if self.follow_links {
                for link in page.links {
                    let same_host = link
                        .host_str()
                        .is_some_and(|host| allowed_hosts.contains(host));
                    if same_host && seen.insert(link.clone()) {
                        queue.push_back(link);
                    }
                }
            }

            if page.text.trim().is_empty() {
                continue;
            }

            documents.push(SourceDocument::new(page.text, url.to_string()));
        }

        if documents.is_empty() {
            return Err(match last_error {
                Some(e) => DomainError::source(format!("No page could be loaded: {}", e)),
                None => DomainError::source("No page contained any text"),
            });
        }

        tracing::info!(pages = documents.len(), "Loaded web documents");

        Ok(documents)
    }

    fn name(&self) -> &'static str {
        "web"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const HOME: &str = "https://lfg.example/";

    fn site() -> MockHttpClient {
        MockHttpClient::new()
            .with_page(
                HOME,
                r#"<body><nav><a href="/cloud">Cloud</a><a href="https://elsewhere.example/">Out</a></nav><p>LFG home.</p></body>"#,
            )
            .with_page(
                "https://lfg.example/cloud",
                r#"<body><nav><a href="/">Home</a></nav><p>Cloud computing at LFG.</p></body>"#,
            )
    }

    #[tokio::test]
    async fn test_loads_start_page_only_by_default() {
        let source = WebSource::new(site(), vec![HOME.to_string()]);

        let documents = source.load().await.unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].source(), HOME);
        assert_eq!(documents[0].content(), "LFG home.");
    }

    #[tokio::test]
    async fn test_follows_same_host_links() {
        let source = WebSource::new(site(), vec![HOME.to_string()]).with_follow_links(true);

        let documents = source.load().await.unwrap();

        let labels: Vec<&str> = documents.iter().map(|d| d.source()).collect();
        assert_eq!(labels, vec![HOME, "https://lfg.example/cloud"]);
        assert!(source
            .client
            .requests()
            .iter()
            .all(|r| !r.url.contains("elsewhere")));
    }

    #[tokio::test]
    async fn test_max_pages_limits_crawl() {
        let source = WebSource::new(site(), vec![HOME.to_string()])
            .with_follow_links(true)
            .with_max_pages(1);

        let documents = source.load().await.unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(source.client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped() {
        let source = WebSource::new(
            site(),
            vec!["https://lfg.example/missing".to_string(), HOME.to_string()],
        );

        let documents = source.load().await.unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].source(), HOME);
    }

    #[tokio::test]
    async fn test_all_pages_failing_is_error() {
        let source = WebSource::new(MockHttpClient::new(), vec![HOME.to_string()]);

        let result = source.load().await;

        assert!(matches!(result, Err(DomainError::Source { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url_is_error() {
        let source = WebSource::new(MockHttpClient::new(), vec!["not a url".to_string()]);

        assert!(source.load().await.is_err());
    }
}
