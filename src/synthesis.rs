//! Final report synthesis.

use crate::gemini::GeminiClient;
use crate::prompts::synthesis;
use crate::record::Record;
use std::fmt::Write as _;
use tracing::{error, info};

/// Number the records and synthesise them into a markdown report.
///
/// Reference numbers are assigned here, 1-based in record order, and stay on
/// the records for the caller's exports. A failed model call degrades to an
/// empty report rather than an error.
pub async fn synthesise(client: &GeminiClient, records: &mut [Record], subject: &str) -> String {
    for (idx, record) in records.iter_mut().enumerate() {
        record.reference_number = Some(idx + 1);
    }

    let mut source_list = String::new();
    for record in records.iter() {
        let number = record.reference_number.unwrap_or(0);
        let _ = writeln!(source_list, "[{number}] {}  {}", record.title, record.url);
    }
    let payload = match serde_json::to_string_pretty(records) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error = %e, "Failed to serialise records for synthesis");
            return String::new();
        }
    };
    let sources = format!("{source_list}\nFull extracts as JSON:\n{payload}");

    let user_prompt = synthesis::build_user_prompt(subject, &sources);
    match client.generate(synthesis::SYSTEM_PROMPT, &user_prompt).await {
        Ok(report) => {
            info!(chars = report.len(), sources = records.len(), "Synthesis complete");
            report
        }
        Err(e) => {
            error!(error = %e, "Synthesis failed");
            String::new()
        }
    }
}
