//! Runtime configuration for the research pipeline.
//!
//! All tunables are read from the environment with documented defaults.
//! Credentials are validated once at startup; the pipeline itself assumes
//! they are present by the time it runs.

use crate::error::{DeepscoutError, Result};

/// Default maximum concurrent web search API calls
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default token budget per fetched document
pub const DEFAULT_MAX_TOKENS_PER_URL: usize = 2_000;

/// Default maximum records retained after deduplication
pub const DEFAULT_MAX_SNIPPETS_TO_KEEP: usize = 100;

/// Default minimum citation count for academic papers
pub const DEFAULT_MIN_CITATION_COUNT: u32 = 3;

/// Default user agent for page fetches
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; DeepscoutBot/1.0)";

/// Pipeline configuration, resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key (relevance judgments, keywords, synthesis)
    pub gemini_key: String,
    /// Brave Search API subscription token
    pub brave_api_key: String,
    /// Maximum concurrent web search API calls
    pub concurrency: usize,
    /// Token budget applied to every extracted document body
    pub max_tokens_per_url: usize,
    /// Maximum records retained after deduplication
    pub max_snippets_to_keep: usize,
    /// Minimum citation count for academic papers
    pub min_citation_count: u32,
    /// User agent sent on page fetches
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_key: String::new(),
            brave_api_key: String::new(),
            concurrency: DEFAULT_CONCURRENCY,
            max_tokens_per_url: DEFAULT_MAX_TOKENS_PER_URL,
            max_snippets_to_keep: DEFAULT_MAX_SNIPPETS_TO_KEEP,
            min_citation_count: DEFAULT_MIN_CITATION_COUNT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Build a configuration from environment variables.
    ///
    /// Missing numeric variables fall back to defaults; malformed values are
    /// ignored with a fallback rather than treated as fatal.
    pub fn from_env() -> Self {
        Self {
            gemini_key: std::env::var("GEMINI_KEY").unwrap_or_default(),
            brave_api_key: std::env::var("BRAVE_API_KEY").unwrap_or_default(),
            concurrency: env_parse("CONCURRENCY", DEFAULT_CONCURRENCY),
            max_tokens_per_url: env_parse("MAX_TOKENS_PER_URL", DEFAULT_MAX_TOKENS_PER_URL),
            max_snippets_to_keep: env_parse("MAX_SNIPPETS_TO_KEEP", DEFAULT_MAX_SNIPPETS_TO_KEEP),
            min_citation_count: env_parse("MIN_CITATION_COUNT", DEFAULT_MIN_CITATION_COUNT),
            user_agent: std::env::var("USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        }
    }

    /// Validate that required credentials are present.
    ///
    /// # Errors
    ///
    /// Returns `Config` error naming every missing credential.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.gemini_key.is_empty() {
            missing.push("GEMINI_KEY");
        }
        if self.brave_api_key.is_empty() {
            missing.push("BRAVE_API_KEY");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DeepscoutError::Config(format!(
                "Missing API keys: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Parse an environment variable, falling back to a default on absence or parse failure.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
