//! Quality gates applied to extracted text before a record is kept.

use crate::record::SourceKind;

/// Minimum extracted length for a web page to count as substantive.
pub const MIN_WEB_CHARS: usize = 500;
/// Minimum extracted length for an academic record.
pub const MIN_ACADEMIC_CHARS: usize = 100;

/// Marketing phrases that mark a web page as promotional rather than
/// informational. Matched case-insensitively as substrings.
pub const HYPE_PHRASES: &[&str] = &[
    "buy now",
    "order now",
    "click here",
    "call now",
    "add to cart",
    "sign up today",
    "subscribe now",
    "book now",
    "limited offer",
];

/// Whether extracted text passes the quality gate for its source kind.
///
/// Web pages must be at least [`MIN_WEB_CHARS`] long and free of hype
/// phrases. Academic text only needs [`MIN_ACADEMIC_CHARS`] characters;
/// the hype filter does not apply since abstracts are not ad copy.
pub fn is_quality(text: &str, kind: SourceKind) -> bool {
    match kind {
        SourceKind::Web => {
            if text.chars().count() < MIN_WEB_CHARS {
                return false;
            }
            let lower = text.to_lowercase();
            !HYPE_PHRASES.iter().any(|phrase| lower.contains(phrase))
        }
        SourceKind::Academic => text.chars().count() >= MIN_ACADEMIC_CHARS,
    }
}

/// Whether a citation count clears the configured minimum.
pub fn meets_citation_threshold(citations: u32, min_citations: u32) -> bool {
    citations >= min_citations
}
