//! Prompt for the paper relevance gate.

pub const SYSTEM_PROMPT: &str = "You are a research assistant screening academic papers. \
Given a research subject and a paper's title and abstract, decide whether the paper is \
directly relevant to the subject. Answer with a single word: YES or NO. Do not explain.";

pub const USER_PROMPT_TEMPLATE: &str = "Research subject: {subject}

Paper title: {title}

Paper abstract:
{abstract}

Is this paper directly relevant to the research subject? Answer YES or NO.";

pub fn build_user_prompt(subject: &str, title: &str, abstract_text: &str) -> String {
    USER_PROMPT_TEMPLATE
        .replace("{subject}", subject)
        .replace("{title}", title)
        .replace("{abstract}", abstract_text)
}
