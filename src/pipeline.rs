//! Post-retrieval filtering: compression, quality gates, deduplication.

use crate::dedup::semantic_dedup;
use crate::extract::compress_text;
use crate::quality::is_quality;
use crate::record::Record;
use tracing::{debug, info};

/// Compress every record body, apply the quality gate, then drop
/// near-duplicates. Survivors keep their compressed body and their relative
/// order; at most `max_keep` records come back.
pub fn filter_records(records: Vec<Record>, max_tokens: usize, max_keep: usize) -> Vec<Record> {
    let total = records.len();
    let mut kept: Vec<Record> = Vec::new();
    for mut record in records {
        let body = compress_text(&record.body, max_tokens);
        if !is_quality(&body, record.source_kind) {
            debug!(title = %record.title, kind = ?record.source_kind, "Record failed quality gate");
            continue;
        }
        record.body = body;
        kept.push(record);
    }

    let bodies: Vec<String> = kept.iter().map(|r| r.body.clone()).collect();
    let keep_indices = semantic_dedup(&bodies, max_keep);

    let mut result: Vec<Record> = Vec::with_capacity(keep_indices.len());
    let mut indices = keep_indices.into_iter().peekable();
    for (idx, record) in kept.into_iter().enumerate() {
        if indices.peek() == Some(&idx) {
            indices.next();
            result.push(record);
        }
    }

    info!(input = total, output = result.len(), "Filtered records");
    result
}
