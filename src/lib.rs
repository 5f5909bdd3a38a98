//! # deepscout
//!
//! Multi-source research evidence pipeline.
//!
//! ## Modules
//!
//! - [`keywords`] - Search query generation via Gemini
//! - [`search`] - Concurrent fan-out across the configured sources
//! - [`brave`] - Brave web search client
//! - [`semantic`] - Semantic Scholar client with citation and relevance gates
//! - [`fetch`] - Page fetching with content-type routing
//! - [`extract`] - HTML/PDF/DOCX text extraction and token-budget truncation
//! - [`quality`] - Length and hype-phrase quality gates
//! - [`dedup`] - TF-IDF near-duplicate suppression
//! - [`pipeline`] - Post-retrieval filtering stage
//! - [`report`] - Bibliometrics reporting
//! - [`synthesis`] - Final report synthesis
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use deepscout::{config::Config, gemini::GeminiClient, search::Sources};
//! use deepscout::record::QuerySet;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     config.validate()?;
//!     let gemini = GeminiClient::new(&config.gemini_key);
//!     let sources = Sources::new(&config, gemini);
//!     let queries = QuerySet {
//!         general: vec!["solid state batteries".to_string()],
//!         academic: vec!["solid electrolyte interface".to_string()],
//!     };
//!     let records = sources.search_all(&queries, "solid state batteries").await;
//!     println!("Found {} records", records.len());
//!     Ok(())
//! }
//! ```

pub mod brave;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod gemini;
pub mod keywords;
pub mod pipeline;
pub mod prompts;
pub mod quality;
pub mod record;
pub mod relevance;
pub mod report;
pub mod retry;
pub mod search;
pub mod semantic;
pub mod synthesis;

pub use error::{DeepscoutError, Result};
