//! Custom error types for deepscout.
//!
//! This module defines all error types used throughout the application.
//! All functions return `Result<T, DeepscoutError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for deepscout operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum DeepscoutError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response parsing error (HTML, JSON payloads, API bodies)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rate limited by external API
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// External API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from API
        code: i32,
        /// Error message from API
        message: String,
    },

    /// LLM collaborator call failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `DeepscoutError`
pub type Result<T> = std::result::Result<T, DeepscoutError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| DeepscoutError::Parse(msg.to_string()))
    }
}
