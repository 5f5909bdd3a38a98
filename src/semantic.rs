//! Semantic Scholar academic graph client.

use crate::error::{DeepscoutError, Result};
use crate::fetch::PageFetcher;
use crate::gemini::GeminiClient;
use crate::quality::meets_citation_threshold;
use crate::record::{Record, SourceMeta, MISSING_ABSTRACT};
use crate::relevance::check_relevance;
use crate::retry::{is_retryable, retry_with_backoff, RetryPolicy};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

const SEMANTIC_SCHOLAR_URL: &str = "https://api.semanticscholar.org/graph/v1/paper/search";
const PAPER_FIELDS: &str = "title,abstract,url,year,venue,authors,citationCount,openAccessPdf";
/// Papers requested per query.
const PAPERS_PER_QUERY: u32 = 20;
/// Retry budget for rate-limited search calls; stricter external rate
/// policy than web search, so a larger budget.
const SEARCH_RETRIES: u32 = 5;
/// Minimum abstract length to use it verbatim as the record body.
const MIN_ABSTRACT_BODY_CHARS: usize = 200;

/// Client for the Semantic Scholar paper search API.
///
/// The API allows one in-flight call per process, so every query shares a
/// single-slot gate held for the duration of the search call only. Page
/// fetches during body-selection fallback are not gated.
#[derive(Debug, Clone)]
pub struct SemanticScholarClient {
    http: reqwest::Client,
    fetcher: PageFetcher,
    gemini: GeminiClient,
    gate: Arc<Semaphore>,
    policy: RetryPolicy,
    min_citations: u32,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PaperSearchResponse {
    #[serde(default)]
    data: Vec<Paper>,
}

#[derive(Debug, Deserialize)]
struct Paper {
    #[serde(default)]
    title: String,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    url: Option<String>,
    year: Option<i32>,
    venue: Option<String>,
    #[serde(default)]
    authors: Vec<Author>,
    #[serde(rename = "citationCount")]
    citation_count: Option<u32>,
    #[serde(rename = "openAccessPdf")]
    open_access_pdf: Option<OpenAccessPdf>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAccessPdf {
    url: Option<String>,
}

impl SemanticScholarClient {
    pub fn new(fetcher: PageFetcher, gemini: GeminiClient, min_citations: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            fetcher,
            gemini,
            gate: Arc::new(Semaphore::new(1)),
            policy: RetryPolicy::new(SEARCH_RETRIES, Duration::from_secs(1)),
            min_citations,
            base_url: SEMANTIC_SCHOLAR_URL.to_string(),
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

    /// Run one query and return the papers that clear the citation and
    /// relevance gates, as academic records in result order. A failed
    /// search yields an empty list rather than an error.
    pub async fn search(&self, query: &str, subject: &str) -> Vec<Record> {
        let response =
            match retry_with_backoff(&self.policy, is_retryable, || self.search_api(query)).await {
                Ok(response) => response,
                Err(e) => {
                    error!(query, error = %e, "Academic search failed");
                    return Vec::new();
                }
            };

        let mut records = Vec::new();
        for paper in response.data {
            if let Some(record) = self.vet_paper(paper, subject).await {
                records.push(record);
            }
        }
        info!(query, count = records.len(), "Academic search complete");
        records
    }

    async fn search_api(&self, query: &str) -> Result<PaperSearchResponse> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| DeepscoutError::Config("academic gate closed".to_string()))?;

        let limit = PAPERS_PER_QUERY.to_string();
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("query", query),
                ("limit", limit.as_str()),
                ("fields", PAPER_FIELDS),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DeepscoutError::RateLimited(1));
        }
        if !status.is_success() {
            return Err(DeepscoutError::Api {
                code: status.as_u16() as i32,
                message: format!("Semantic Scholar returned {status}"),
            });
        }

        Ok(response.json().await?)
    }

    /// Apply the citation and relevance gates, then pick the record body.
    async fn vet_paper(&self, paper: Paper, subject: &str) -> Option<Record> {
        let citations = paper.citation_count.unwrap_or(0);
        if !meets_citation_threshold(citations, self.min_citations) {
            debug!(title = %paper.title, citations, "Paper below citation threshold");
            return None;
        }

        let abstract_text = paper.abstract_text.clone().unwrap_or_default();
        if !check_relevance(&self.gemini, subject, &paper.title, &abstract_text).await {
            debug!(title = %paper.title, "Paper not relevant");
            return None;
        }

        let url = paper
            .url
            .clone()
            .or_else(|| paper.open_access_pdf.as_ref().and_then(|p| p.url.clone()))
            .unwrap_or_default();
        let body = self.select_body(&abstract_text, &url).await;

        let meta = SourceMeta::Academic {
            year: paper.year,
            venue: paper.venue,
            citations: paper.citation_count,
            authors: paper.authors.into_iter().filter_map(|a| a.name).collect(),
            open_access: paper.open_access_pdf.is_some(),
        };
        Some(Record::academic(
            paper.title,
            body,
            url,
            meta,
            paper.abstract_text,
        ))
    }

    /// A long abstract is used verbatim; otherwise a full-text fetch wins
    /// only when it is strictly longer than the abstract. With neither, a
    /// placeholder keeps the record printable.
    async fn select_body(&self, abstract_text: &str, url: &str) -> String {
        if abstract_text.chars().count() >= MIN_ABSTRACT_BODY_CHARS {
            return abstract_text.to_string();
        }
        if !url.is_empty() {
            let fetched = self.fetcher.fetch_text(url).await;
            if fetched.chars().count() > abstract_text.chars().count() {
                return fetched;
            }
        }
        if abstract_text.is_empty() {
            MISSING_ABSTRACT.to_string()
        } else {
            abstract_text.to_string()
        }
    }
}
