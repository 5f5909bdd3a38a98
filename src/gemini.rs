//! Minimal Gemini generateContent client.
//!
//! One client instance is constructed at startup and threaded through the
//! keyword, relevance and synthesis stages; nothing here touches process
//! globals, so tests can point a client at a local mock server.

use crate::error::{DeepscoutError, OptionExt, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Model used for all pipeline calls.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Handle to the Gemini generateContent endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        self.base_url = url.into();
    }

    /// Send one prompt and return the first candidate's text.
    pub async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = json!({
            "system_instruction": { "parts": [{ "text": system_prompt }] },
            "contents": [{ "parts": [{ "text": user_prompt }] }],
        });

        debug!(model = %self.model, prompt_chars = user_prompt.len(), "Calling Gemini");
        let response = self
            .http
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DeepscoutError::Llm(format!(
                "Gemini returned {status}: {detail}"
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        extract_text(parsed)
    }
}

fn extract_text(response: GenerateResponse) -> Result<String> {
    response
        .candidates
        .and_then(|mut candidates| {
            if candidates.is_empty() {
                None
            } else {
                candidates.swap_remove(0).content
            }
        })
        .and_then(|content| content.parts)
        .and_then(|mut parts| {
            if parts.is_empty() {
                None
            } else {
                parts.swap_remove(0).text
            }
        })
        .ok_or_parse("Gemini response missing candidate text")
}
