//! Brave web search client.

use crate::error::{DeepscoutError, Result};
use crate::fetch::PageFetcher;
use crate::record::Record;
use crate::retry::{is_retryable, retry_with_backoff, RetryPolicy};
use futures::future::join_all;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info};

const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";
/// Results requested per query.
const RESULTS_PER_QUERY: u32 = 10;
/// Retry budget for rate-limited search calls.
const SEARCH_RETRIES: u32 = 3;

/// Client for the Brave web search API.
///
/// Search calls across all queries share one counting semaphore; the page
/// fetches spawned for a query's results are not gated and fan out freely.
#[derive(Debug, Clone)]
pub struct BraveClient {
    http: reqwest::Client,
    api_key: String,
    fetcher: PageFetcher,
    semaphore: Arc<Semaphore>,
    policy: RetryPolicy,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    web: Option<WebSection>,
}

#[derive(Debug, Deserialize)]
struct WebSection {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    #[serde(default)]
    title: String,
    url: Option<String>,
    description: Option<String>,
}

impl BraveClient {
    pub fn new(api_key: impl Into<String>, fetcher: PageFetcher, concurrency: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            fetcher,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            policy: RetryPolicy::new(SEARCH_RETRIES, Duration::from_secs(1)),
            base_url: BRAVE_SEARCH_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        self.base_url = url.into();
    }

    #[cfg(test)]
    pub fn set_policy(&mut self, policy: RetryPolicy) {
        self.policy = policy;
    }

    /// Run one query: search, fetch every result page, build web records.
    ///
    /// Failure of the search call itself yields an empty list so one bad
    /// query never voids the rest of the batch. Records follow the order
    /// the API returned results; pages that fetch empty produce no record.
    /// Record URLs are resolved through redirects to the final page.
    pub async fn search(&self, query: &str) -> Vec<Record> {
        let response =
            match retry_with_backoff(&self.policy, is_retryable, || self.search_api(query)).await {
                Ok(response) => response,
                Err(e) => {
                    error!(query, error = %e, "Web search failed");
                    return Vec::new();
                }
            };

        let results: Vec<WebResult> = response
            .web
            .map(|section| section.results)
            .unwrap_or_default()
            .into_iter()
            .filter(|r| {
                r.url
                    .as_deref()
                    .is_some_and(|u| url::Url::parse(u).is_ok())
            })
            .collect();

        let pages = join_all(results.iter().map(|r| {
            let url = r.url.clone().unwrap_or_default();
            let fetcher = self.fetcher.clone();
            async move {
                let body = fetcher.fetch_text(&url).await;
                // Cite the final page, not the tracker URL the API hands out.
                let resolved = if body.is_empty() {
                    url
                } else {
                    fetcher.resolve_url(&url).await
                };
                (body, resolved)
            }
        }))
        .await;

        let mut records = Vec::new();
        for (result, (body, url)) in results.into_iter().zip(pages) {
            if body.is_empty() {
                continue;
            }
            records.push(Record::web(result.title, body, url, result.description));
        }

        info!(query, count = records.len(), "Web search complete");
        records
    }

    async fn search_api(&self, query: &str) -> Result<SearchResponse> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| DeepscoutError::Config("web concurrency gate closed".to_string()))?;

        let count = RESULTS_PER_QUERY.to_string();
        let response = self
            .http
            .get(&self.base_url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Err(DeepscoutError::RateLimited(retry_after));
        }
        if !status.is_success() {
            return Err(DeepscoutError::Api {
                code: status.as_u16() as i32,
                message: format!("Brave search returned {status}"),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(server: &mockito::Server) -> BraveClient {
        let mut client = BraveClient::new("key", PageFetcher::new("test-agent"), 5);
        client.set_base_url(format!("{}/res/v1/web/search", server.url()));
        client.set_policy(RetryPolicy::new(SEARCH_RETRIES, Duration::from_millis(1)));
        client
    }

    fn search_body(server_url: &str) -> String {
        serde_json::json!({
            "web": {
                "results": [
                    {
                        "title": "First result",
                        "url": format!("{server_url}/page-one"),
                        "description": "summary one"
                    },
                    {
                        "title": "Dead result",
                        "url": format!("{server_url}/page-dead"),
                        "description": "summary two"
                    }
                ]
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_search_builds_records_in_result_order() {
        let mut server = mockito::Server::new_async().await;
        let _api = server
            .mock("GET", "/res/v1/web/search")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "rust async".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(search_body(&server.url()))
            .create_async()
            .await;
        let _page = server
            .mock("GET", "/page-one")
            .with_status(200)
            .with_body("page one body text")
            .create_async()
            .await;
        let _dead = server
            .mock("GET", "/page-dead")
            .with_status(404)
            .create_async()
            .await;
        let _head = server
            .mock("HEAD", "/page-one")
            .with_status(200)
            .create_async()
            .await;

        let client = test_client(&server);
        let records = client.search("rust async").await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "First result");
        assert_eq!(records[0].body, "page one body text");
        assert!(records[0].url.ends_with("/page-one"));
    }

    #[tokio::test]
    async fn test_record_url_follows_redirect() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "web": {
                "results": [{
                    "title": "Tracked result",
                    "url": format!("{}/go/one", server.url()),
                    "description": "summary"
                }]
            }
        })
        .to_string();
        let _api = server
            .mock("GET", "/res/v1/web/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        let _page = server
            .mock("GET", "/go/one")
            .with_status(200)
            .with_body("landing page body")
            .create_async()
            .await;
        let landing = format!("{}/landing", server.url());
        let _hop = server
            .mock("HEAD", "/go/one")
            .with_status(301)
            .with_header("location", landing.as_str())
            .create_async()
            .await;
        let _final = server
            .mock("HEAD", "/landing")
            .with_status(200)
            .create_async()
            .await;

        let client = test_client(&server);
        let records = client.search("anything").await;

        assert_eq!(records.len(), 1);
        assert!(records[0].url.ends_with("/landing"));
    }

    #[tokio::test]
    async fn test_rate_limit_exhaustion_is_empty() {
        // Initial call plus three backoff retries, then give up.
        let mut server = mockito::Server::new_async().await;
        let limited = server
            .mock("GET", "/res/v1/web/search")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .expect(4)
            .create_async()
            .await;

        let client = test_client(&server);
        let records = client.search("anything").await;

        assert!(records.is_empty());
        limited.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _api = server
            .mock("GET", "/res/v1/web/search")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server);
        assert!(client.search("anything").await.is_empty());
    }
}
