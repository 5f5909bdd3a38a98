//! Bibliometrics reporting over the final record set.

use crate::error::Result;
use crate::record::{Record, SourceKind, SourceMeta};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;

const BANNER: &str = "================================================================================";
const RULE: &str = "--------------------------------------------------------------------------------";

/// Render the fixed-format bibliometrics report for the current time.
pub fn generate_bibliometrics(records: &[Record]) -> String {
    render_bibliometrics(records, &Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Write the report next to `dir` with a timestamped filename.
pub fn save_bibliometrics(records: &[Record], dir: &Path) -> Result<PathBuf> {
    let text = generate_bibliometrics(records);
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("bibliometrics_{timestamp}.txt"));
    std::fs::write(&path, text)?;
    info!(path = %path.display(), "Bibliometrics saved");
    Ok(path)
}

fn render_bibliometrics(records: &[Record], timestamp: &str) -> String {
    let web = records
        .iter()
        .filter(|r| r.source_kind == SourceKind::Web)
        .count();
    let academic: Vec<&Record> = records
        .iter()
        .filter(|r| r.source_kind == SourceKind::Academic)
        .collect();

    let mut lines: Vec<String> = vec![
        BANNER.to_string(),
        format!("BIBLIOMETRICS REPORT - {timestamp}"),
        BANNER.to_string(),
        String::new(),
        "SUMMARY STATISTICS".to_string(),
        RULE.to_string(),
        format!("Total Sources: {}", records.len()),
        format!("  - Web: {web}"),
        format!("  - Academic: {}", academic.len()),
        String::new(),
    ];

    if !academic.is_empty() {
        lines.push("ACADEMIC SOURCES".to_string());
        lines.push(RULE.to_string());
        for (idx, record) in academic.iter().enumerate() {
            lines.push(format!("\n[{}] {}", idx + 1, record.title));
            lines.push(format!("    URL: {}", record.url));
            if let SourceMeta::Academic {
                year,
                venue,
                citations,
                authors,
                ..
            } = &record.meta
            {
                lines.push(format!(
                    "    Journal: {}",
                    venue.as_deref().unwrap_or("N/A")
                ));
                lines.push(format!(
                    "    Year: {}",
                    year.map_or_else(|| "N/A".to_string(), |y| y.to_string())
                ));
                lines.push(format!(
                    "    Citations: {}",
                    citations.map_or_else(|| "N/A".to_string(), |c| c.to_string())
                ));
                if !authors.is_empty() {
                    lines.push(format!("    Authors: {}", authors.join(", ")));
                }
            }
        }
    }

    lines.push(String::new());
    lines.push(BANNER.to_string());
    lines.push("END OF REPORT".to_string());
    lines.push(BANNER.to_string());
    lines.join("\n")
}
