//! Text extraction and compression for fetched documents.
//!
//! Raw page bodies arrive as HTML, PDF, DOCX or plain text. Everything is
//! flattened to whitespace-normalised plain text and truncated to a token
//! budget before the quality gates run.

use regex::Regex;
use scraper::{ElementRef, Html};
use std::io::{Cursor, Read};
use std::sync::LazyLock;
use tracing::warn;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

/// Rough character-per-token ratio used for budget estimates.
pub const EST_CHAR_PER_TOKEN: usize = 4;

/// Elements whose subtrees are skipped when flattening HTML.
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "table", "noscript", "form",
    "iframe",
];

/// Estimated token count of `text` under the 4-chars-per-token heuristic.
pub fn token_estimate(text: &str) -> usize {
    text.chars().count() / EST_CHAR_PER_TOKEN
}

/// Flatten `input` to plain text and truncate to `max_tokens`.
///
/// Inputs shorter than 10 characters yield an empty string. Markup is
/// detected by the presence of an `<html`, `<body` or `<div` marker; anything
/// else is treated as already-plain text. Truncation is a hard character cut
/// at `max_tokens * EST_CHAR_PER_TOKEN`, mid-sentence allowed.
pub fn compress_text(input: &str, max_tokens: usize) -> String {
    let trimmed = input.trim();
    if trimmed.chars().count() < 10 {
        return String::new();
    }

    let lower = trimmed.to_lowercase();
    let text = if lower.contains("<html") || lower.contains("<body") || lower.contains("<div") {
        let extracted = extract_html_text(trimmed);
        // A fragment that extracts to nothing still carries its raw text;
        // a full document that extracts to nothing is genuinely empty.
        if extracted.is_empty() && !lower.contains("<html") {
            normalize_whitespace(trimmed)
        } else {
            extracted
        }
    } else {
        normalize_whitespace(trimmed)
    };

    if token_estimate(&text) > max_tokens {
        truncate_chars(&text, max_tokens * EST_CHAR_PER_TOKEN)
    } else {
        text
    }
}

/// Extract text from a PDF byte buffer. Returns an empty string on any
/// decode failure so a malformed document degrades to a skipped record.
pub fn pdf_to_text(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Failed to extract PDF text");
            String::new()
        }
    }
}

/// Extract text from a DOCX byte buffer by reading `word/document.xml`.
/// Returns an empty string on any failure, mirroring [`pdf_to_text`].
pub fn docx_to_text(bytes: &[u8]) -> String {
    let cursor = Cursor::new(bytes);
    let mut archive = match zip::ZipArchive::new(cursor) {
        Ok(a) => a,
        Err(e) => {
            warn!(error = %e, "Failed to open DOCX archive");
            return String::new();
        }
    };

    let mut xml = String::new();
    match archive.by_name("word/document.xml") {
        Ok(mut entry) => {
            if entry.read_to_string(&mut xml).is_err() {
                warn!("Failed to read DOCX document body");
                return String::new();
            }
        }
        Err(e) => {
            warn!(error = %e, "DOCX missing document body");
            return String::new();
        }
    }

    document_xml_to_text(&xml)
}

/// Collect the `w:t` runs of a WordprocessingML body, one line per paragraph.
fn document_xml_to_text(xml: &str) -> String {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_run = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_run => match t.unescape() {
                Ok(text) => out.push_str(&text),
                Err(e) => {
                    warn!(error = %e, "Malformed DOCX text run");
                    return String::new();
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "Malformed DOCX XML");
                return String::new();
            }
            _ => {}
        }
    }
    out.trim().to_string()
}

fn extract_html_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    collect_text(document.root_element(), &mut out);
    normalize_whitespace(&out)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !EXCLUDED_TAGS.contains(&child_el.value().name()) {
                collect_text(child_el, out);
            }
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
