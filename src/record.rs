//! Core data model: the record flowing through the retrieval pipeline.

use serde::{Deserialize, Serialize};

/// Placeholder title when a source omits one
pub const DEFAULT_TITLE: &str = "No Title";

/// Placeholder body when an academic record has no usable text at all
pub const MISSING_ABSTRACT: &str = "Abstract not available.";

/// Which kind of source produced a record.
///
/// Immutable after creation; drives the quality, citation, and relevance policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// General web search result
    Web,
    /// Academic graph record
    Academic,
}

/// Per-kind record metadata.
///
/// The field set is fixed per source kind instead of an open key-value map,
/// so presence checks happen at compile time. Citation counts still default
/// to zero when absent — see [`Record::citations`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceMeta {
    /// Metadata attached to web search results
    Web {
        /// Search-engine result description, when provided
        description: Option<String>,
    },
    /// Metadata attached to academic graph records
    Academic {
        /// Publication year
        year: Option<i32>,
        /// Journal or conference venue
        venue: Option<String>,
        /// Citation count; `None` behaves as 0 everywhere downstream
        citations: Option<u32>,
        /// Author display names
        authors: Vec<String>,
        /// Whether an open-access PDF is available
        open_access: bool,
    },
}

/// A single retrieved unit of evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Display title, never empty (defaulted if the source omits it)
    pub title: String,
    /// Normalized text content; overwritten in place by extraction and dedup
    pub body: String,
    /// Source locator; may be empty for abstract-only academic records
    pub url: String,
    /// Which source produced this record
    pub source_kind: SourceKind,
    /// Source-kind-specific metadata
    pub meta: SourceMeta,
    /// Abstract text, populated only for academic records; survives body replacement
    pub abstract_text: Option<String>,
    /// Reference number, assigned at synthesis time only
    pub reference_number: Option<usize>,
}

impl Record {
    /// Create a web record.
    pub fn web(title: impl Into<String>, body: String, url: String, description: Option<String>) -> Self {
        Self {
            title: non_empty_title(title.into()),
            body,
            url,
            source_kind: SourceKind::Web,
            meta: SourceMeta::Web { description },
            abstract_text: None,
            reference_number: None,
        }
    }

    /// Create an academic record.
    pub fn academic(
        title: impl Into<String>,
        body: String,
        url: String,
        meta: SourceMeta,
        abstract_text: Option<String>,
    ) -> Self {
        Self {
            title: non_empty_title(title.into()),
            body,
            url,
            source_kind: SourceKind::Academic,
            meta,
            abstract_text,
            reference_number: None,
        }
    }

    /// Citation count with the absent-means-zero rule applied.
    ///
    /// A missing count is treated as 0 for filtering, never as "unknown".
    /// Web records have no citations and always report 0.
    pub fn citations(&self) -> u32 {
        match &self.meta {
            SourceMeta::Academic { citations, .. } => citations.unwrap_or(0),
            SourceMeta::Web { .. } => 0,
        }
    }
}

/// Default empty titles to a placeholder so titles are never blank.
fn non_empty_title(title: String) -> String {
    if title.trim().is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

/// The caller-specified query sequences driving source fan-out.
///
/// The length of each list is load-bearing: one fetch task is issued per entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySet {
    /// Queries for the general web search source
    pub general: Vec<String>,
    /// Queries for the academic graph source
    pub academic: Vec<String>,
}
