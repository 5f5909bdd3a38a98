//! Prompt for the final report synthesis.

pub const SYSTEM_PROMPT: &str = "You are a research analyst writing a literature review. \
Write in markdown. Cite evidence using bracketed reference numbers like [3] that refer to \
the numbered sources provided. Only make claims supported by the sources.";

pub const USER_PROMPT_TEMPLATE: &str = "Research subject: {subject}

Numbered source material:

{sources}

Write a structured markdown research report on the subject. Open with a short summary, \
cover the main findings thematically, note disagreements between sources, and close with \
open questions. Cite sources by their bracketed numbers.";

pub fn build_user_prompt(subject: &str, sources: &str) -> String {
    USER_PROMPT_TEMPLATE
        .replace("{subject}", subject)
        .replace("{sources}", sources)
}
