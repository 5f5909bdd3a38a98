//! Fan-out across the configured sources.

use crate::brave::BraveClient;
use crate::config::Config;
use crate::fetch::PageFetcher;
use crate::gemini::GeminiClient;
use crate::record::{QuerySet, Record};
use crate::semantic::SemanticScholarClient;
use futures::future::join_all;
use tracing::info;

/// The configured source clients, bundled for the pipeline and server.
#[derive(Debug, Clone)]
pub struct Sources {
    brave: BraveClient,
    scholar: SemanticScholarClient,
}

impl Sources {
    pub fn new(config: &Config, gemini: GeminiClient) -> Self {
        let fetcher = PageFetcher::new(&config.user_agent);
        let brave = BraveClient::new(&config.brave_api_key, fetcher.clone(), config.concurrency);
        let scholar = SemanticScholarClient::new(fetcher, gemini, config.min_citation_count);
        Self { brave, scholar }
    }

    #[cfg(test)]
    pub fn from_parts(brave: BraveClient, scholar: SemanticScholarClient) -> Self {
        Self { brave, scholar }
    }

    /// Run every query against its source concurrently and pool the records.
    ///
    /// One task per general query and one per academic query; all tasks run
    /// to completion, and a query that fails contributes an empty list
    /// instead of aborting the batch. Web records are concatenated before
    /// academic records; ordering across queries of one kind is whatever
    /// the scheduler produced.
    pub async fn search_all(&self, queries: &QuerySet, subject: &str) -> Vec<Record> {
        let web_tasks = queries.general.iter().map(|q| self.brave.search(q));
        let academic_tasks = queries.academic.iter().map(|q| self.scholar.search(q, subject));

        let (web_batches, academic_batches) =
            tokio::join!(join_all(web_tasks), join_all(academic_tasks));

        let mut records: Vec<Record> = web_batches.into_iter().flatten().collect();
        let web_count = records.len();
        records.extend(academic_batches.into_iter().flatten());

        info!(
            web = web_count,
            academic = records.len() - web_count,
            "Source fan-out complete"
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SourceKind;
    use crate::retry::RetryPolicy;
    use std::time::Duration;

    const LONG_ABSTRACT: &str = "An abstract long enough to be used verbatim as a record \
body under the two-hundred-character rule, padded with further discussion of methods, \
datasets, evaluation protocol and the limitations of the presented approach so that the \
length requirement is comfortably met.";

    async fn sources_against(server: &mockito::Server) -> Sources {
        let fetcher = PageFetcher::new("test-agent");
        let mut brave = BraveClient::new("key", fetcher.clone(), 5);
        brave.set_base_url(format!("{}/res/v1/web/search", server.url()));
        brave.set_policy(RetryPolicy::new(0, Duration::from_millis(1)));

        let mut gemini = GeminiClient::new("key");
        gemini.set_base_url(server.url());
        let mut scholar = SemanticScholarClient::new(fetcher, gemini, 3);
        scholar.set_base_url(format!("{}/graph/v1/paper/search", server.url()));
        scholar.set_policy(RetryPolicy::new(0, Duration::from_millis(1)));

        Sources::from_parts(brave, scholar)
    }

    fn queries() -> QuerySet {
        QuerySet {
            general: vec!["web query".to_string()],
            academic: vec!["academic query".to_string()],
        }
    }

    #[tokio::test]
    async fn test_web_records_precede_academic() {
        let mut server = mockito::Server::new_async().await;
        let _web_api = server
            .mock("GET", "/res/v1/web/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "web": { "results": [{
                        "title": "A page",
                        "url": format!("{}/page", server.url()),
                        "description": "d"
                    }]}
                })
                .to_string(),
            )
            .create_async()
            .await;
        let _page = server
            .mock("GET", "/page")
            .with_status(200)
            .with_body("web page body")
            .create_async()
            .await;
        let _scholar_api = server
            .mock("GET", "/graph/v1/paper/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "data": [{ "title": "A paper", "abstract": LONG_ABSTRACT, "citationCount": 7 }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let _llm = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".into()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "candidates": [{ "content": { "parts": [{ "text": "YES" }] } }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let sources = sources_against(&server).await;
        let records = sources.search_all(&queries(), "subject").await;

        let kinds: Vec<SourceKind> = records.iter().map(|r| r.source_kind).collect();
        assert_eq!(kinds, vec![SourceKind::Web, SourceKind::Academic]);
    }

    #[tokio::test]
    async fn test_failed_source_contributes_empty_list() {
        let mut server = mockito::Server::new_async().await;
        let _web_api = server
            .mock("GET", "/res/v1/web/search")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let _scholar_api = server
            .mock("GET", "/graph/v1/paper/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "data": [{ "title": "Survivor", "abstract": LONG_ABSTRACT, "citationCount": 7 }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let _llm = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".into()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "candidates": [{ "content": { "parts": [{ "text": "YES" }] } }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let sources = sources_against(&server).await;
        let records = sources.search_all(&queries(), "subject").await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Survivor");
    }
}
