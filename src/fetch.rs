//! Full-page fetching for web results and open-access papers.

use crate::extract::{docx_to_text, pdf_to_text};
use reqwest::header::USER_AGENT;
use std::time::Duration;
use tracing::{debug, warn};

/// Extra attempts after the first failed fetch.
const FETCH_RETRIES: u32 = 2;
/// Fixed pause between page fetch attempts.
const FETCH_RETRY_PAUSE: Duration = Duration::from_secs(1);
/// Per-request timeout for page bodies.
const PAGE_TIMEOUT: Duration = Duration::from_secs(15);
/// Per-request timeout for redirect resolution.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches page bodies and decodes them to text by content type.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    http: reqwest::Client,
    user_agent: String,
}

impl PageFetcher {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            user_agent: user_agent.into(),
        }
    }

    /// Fetch `url` and return its textual content.
    ///
    /// Transport failures are retried twice with a fixed one second pause;
    /// a non-success status or exhausted retries yield an empty string so a
    /// dead link degrades to a skipped record. PDF and DOCX responses are
    /// routed to their decoders, everything else is read as lossy UTF-8.
    pub async fn fetch_text(&self, url: &str) -> String {
        for attempt in 0..=FETCH_RETRIES {
            match self.try_fetch(url).await {
                Ok(text) => return text,
                Err(e) => {
                    warn!(url, attempt = attempt + 1, error = %e, "Page fetch failed");
                    if attempt < FETCH_RETRIES {
                        tokio::time::sleep(FETCH_RETRY_PAUSE).await;
                    }
                }
            }
        }
        String::new()
    }

    async fn try_fetch(&self, url: &str) -> reqwest::Result<String> {
        let response = self
            .http
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(PAGE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Skipping page with error status");
            return Ok(String::new());
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        let bytes = response.bytes().await?;

        let text = if content_type.contains("pdf") || url.ends_with(".pdf") {
            pdf_to_text(&bytes)
        } else if content_type.contains("officedocument") || url.ends_with(".docx") {
            docx_to_text(&bytes)
        } else {
            String::from_utf8_lossy(&bytes).into_owned()
        };
        Ok(text)
    }

    /// Follow redirects and return the final URL, or the input on failure.
    /// Search APIs hand out tracker URLs; reports should cite the real page.
    pub async fn resolve_url(&self, url: &str) -> String {
        let result = self
            .http
            .head(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(RESOLVE_TIMEOUT)
            .send()
            .await;
        match result {
            Ok(response) => response.url().to_string(),
            Err(e) => {
                debug!(url, error = %e, "URL resolution failed, keeping original");
                url.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_plain_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>hi</body></html>")
            .create_async()
            .await;

        let fetcher = PageFetcher::new("test-agent");
        let text = fetcher.fetch_text(&format!("{}/page", server.url())).await;

        assert_eq!(text, "<html><body>hi</body></html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_empty_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/gone")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let fetcher = PageFetcher::new("test-agent");
        let text = fetcher.fetch_text(&format!("{}/gone", server.url())).await;

        assert_eq!(text, "");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_host_is_empty() {
        let fetcher = PageFetcher::new("test-agent");
        let text = fetcher.fetch_text("http://127.0.0.1:1/nothing").await;
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_pdf_content_type_routes_to_decoder() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/paper")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("definitely not a pdf")
            .create_async()
            .await;

        let fetcher = PageFetcher::new("test-agent");
        // Decode failure degrades to empty rather than returning raw bytes.
        let text = fetcher.fetch_text(&format!("{}/paper", server.url())).await;
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_resolve_url_follows_redirect() {
        let mut server = mockito::Server::new_async().await;
        let _redirect = server
            .mock("HEAD", "/short")
            .with_status(301)
            .with_header("location", &format!("{}/final", server.url()))
            .create_async()
            .await;
        let _target = server
            .mock("HEAD", "/final")
            .with_status(200)
            .create_async()
            .await;

        let fetcher = PageFetcher::new("test-agent");
        let resolved = fetcher.resolve_url(&format!("{}/short", server.url())).await;
        assert!(resolved.ends_with("/final"));
    }

    #[tokio::test]
    async fn test_resolve_url_failure_keeps_input() {
        let fetcher = PageFetcher::new("test-agent");
        let resolved = fetcher.resolve_url("http://127.0.0.1:1/x").await;
        assert_eq!(resolved, "http://127.0.0.1:1/x");
    }
}
