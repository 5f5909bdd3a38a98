//! Prompt for search query generation.

pub const SYSTEM_PROMPT: &str = "You are a research assistant generating search queries. \
Respond with JSON only, no prose and no markdown fences.";

pub const USER_PROMPT_TEMPLATE: &str = "Research subject: {subject}

Generate search queries for a literature survey of this subject:
- exactly {general_count} general web search queries, phrased for a consumer search engine
- exactly {academic_count} academic search queries, phrased for a scholarly paper index

Return a JSON object of the form:
{\"general\": [\"...\"], \"academic\": [\"...\"]}";

pub fn build_user_prompt(subject: &str, general_count: usize, academic_count: usize) -> String {
    USER_PROMPT_TEMPLATE
        .replace("{subject}", subject)
        .replace("{general_count}", &general_count.to_string())
        .replace("{academic_count}", &academic_count.to_string())
}
