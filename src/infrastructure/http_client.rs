//! Shared HTTP client used by every vendor adapter

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    /// POST a JSON body, returning the parsed JSON response (`Null` for an empty body)
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    /// GET a resource as text
    async fn get_text(&self, url: &str, headers: Vec<(&str, &str)>) -> Result<String, DomainError>;

    /// HEAD a resource, returning the total of its `Content-Range` header
    async fn head_count(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<Option<usize>, DomainError>;

    /// DELETE a resource, returning the `Content-Range` total when the server reports one
    async fn delete(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<Option<usize>, DomainError>;
}

/// Total after the slash of a `Content-Range` value (`0-24/120`, `*/0`); `None` for `*/*`
pub fn parse_content_range_total(value: &str) -> Option<usize> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

fn content_range_total(response: &reqwest::Response) -> Option<usize> {
    response
        .headers()
        .get(reqwest::header::CONTENT_RANGE)?
        .to_str()
        .ok()
        .and_then(parse_content_range_total)
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rag-answer-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn send(
        request: reqwest::RequestBuilder,
        headers: Vec<(&str, &str)>,
    ) -> Result<reqwest::Response, DomainError> {
        let mut request = request;

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::provider("http", format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let response = Self::send(self.client.post(url).json(body), headers).await?;

        let text = response
            .text()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to read response: {}", e)))?;

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| DomainError::provider("http", format!("Failed to parse response: {}", e)))
    }

    async fn get_text(&self, url: &str, headers: Vec<(&str, &str)>) -> Result<String, DomainError> {
        let response = Self::send(self.client.get(url), headers).await?;

        response
            .text()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to read response: {}", e)))
    }

    async fn head_count(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<Option<usize>, DomainError> {
        let response = Self::send(self.client.head(url), headers).await?;
        Ok(content_range_total(&response))
    }

    async fn delete(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<Option<usize>, DomainError> {
        let response = Self::send(self.client.delete(url), headers).await?;
        Ok(content_range_total(&response))
    }
}
