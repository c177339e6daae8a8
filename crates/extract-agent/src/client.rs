use std::time::Duration;

use crate::error::ExtractError;
use crate::types::{ExtractRequest, ExtractResponse};
use crate::Result;

/// HTTP client for the extraction service.
///
/// Every request carries a bounded timeout; a hung service surfaces as
/// [`ExtractError::Timeout`], never an indefinite wait.
#[derive(Debug, Clone)]
pub struct ExtractClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExtractClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        api_key: Option<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Propose action items for `text`.
    ///
    /// Zero candidates is `Ok` — the service distinguishes "no tasks in this
    /// text" from failure, and so do we.
    pub async fn extract(&self, text: &str) -> Result<ExtractResponse> {
        let url = format!("{}/v1/extract", self.base_url);
        let mut req = self.http.post(&url).json(&ExtractRequest { text });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if status.as_u16() == 429 {
            tracing::warn!("extraction service throttled the request");
            return Err(ExtractError::RateLimited);
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "extraction service failed");
            return Err(ExtractError::Service(status.as_u16()));
        }

        let body = resp.text().await?;
        let parsed: ExtractResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            candidates = parsed.action_items.len(),
            confidence = ?parsed.confidence,
            "extraction succeeded"
        );
        Ok(parsed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Confidence;

    fn client(url: &str) -> ExtractClient {
        ExtractClient::new(url, Duration::from_secs(5), None).unwrap()
    }

    #[tokio::test]
    async fn populated_response_parses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/extract")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"action_items":[{"title":"Update docs","due_date":"2026-08-28"},
                    {"title":"Review PR #123"}],"confidence":"medium"}"#,
            )
            .create_async()
            .await;

        let resp = client(&server.url()).extract("John to update docs…").await.unwrap();
        assert_eq!(resp.action_items.len(), 2);
        assert_eq!(resp.confidence, Confidence::Medium);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_result_is_ok_not_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/extract")
            .with_status(200)
            .with_body(r#"{"action_items":[],"confidence":"high"}"#)
            .create_async()
            .await;

        let resp = client(&server.url()).extract("weather chat").await.unwrap();
        assert!(resp.action_items.is_empty());
    }

    #[tokio::test]
    async fn http_429_maps_to_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/extract")
            .with_status(429)
            .create_async()
            .await;

        let err = client(&server.url()).extract("text").await.unwrap_err();
        assert!(matches!(err, ExtractError::RateLimited));
    }

    #[tokio::test]
    async fn http_500_maps_to_service_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/extract")
            .with_status(500)
            .create_async()
            .await;

        let err = client(&server.url()).extract("text").await.unwrap_err();
        assert!(matches!(err, ExtractError::Service(500)));
    }

    #[tokio::test]
    async fn garbage_body_maps_to_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/extract")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server.url()).extract("text").await.unwrap_err();
        assert!(matches!(err, ExtractError::Malformed(_)));
    }

    #[tokio::test]
    async fn api_key_is_sent_as_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/extract")
            .match_header("authorization", "Bearer sekrit")
            .with_status(200)
            .with_body(r#"{"action_items":[]}"#)
            .create_async()
            .await;

        let client =
            ExtractClient::new(server.url(), Duration::from_secs(5), Some("sekrit".into()))
                .unwrap();
        client.extract("text").await.unwrap();
        mock.assert_async().await;
    }
}
