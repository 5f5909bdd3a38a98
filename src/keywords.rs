//! Search query generation.

use crate::gemini::GeminiClient;
use crate::prompts::keywords;
use crate::record::QuerySet;
use serde::Deserialize;
use tracing::{error, warn};

#[derive(Debug, Deserialize)]
struct KeywordResponse {
    #[serde(default)]
    general: Vec<String>,
    #[serde(default)]
    academic: Vec<String>,
}

/// Ask the model for search queries, guaranteeing the requested counts.
///
/// The model's lists are padded or truncated to exactly `general_count` and
/// `academic_count` entries; a failed call or unparseable answer falls back
/// to synthetic queries derived from the subject. The counts drive the
/// source fan-out, so they are honoured no matter what the model returns.
pub async fn generate_keywords(
    client: &GeminiClient,
    subject: &str,
    general_count: usize,
    academic_count: usize,
) -> QuerySet {
    let user_prompt = keywords::build_user_prompt(subject, general_count, academic_count);
    let answer = match client.generate(keywords::SYSTEM_PROMPT, &user_prompt).await {
        Ok(answer) => answer,
        Err(e) => {
            error!(error = %e, "Keyword generation failed, using fallback queries");
            return fallback_queries(subject, general_count, academic_count);
        }
    };

    let cleaned = answer.replace("```json", "").replace("```", "");
    let parsed: KeywordResponse = match serde_json::from_str(cleaned.trim()) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(error = %e, "Failed to parse keyword JSON, using fallback queries");
            return fallback_queries(subject, general_count, academic_count);
        }
    };

    QuerySet {
        general: pad_or_truncate(parsed.general, general_count, |n| format!("{subject} {n}")),
        academic: pad_or_truncate(parsed.academic, academic_count, |n| {
            format!("{subject} research paper {n}")
        }),
    }
}

fn pad_or_truncate(
    mut queries: Vec<String>,
    count: usize,
    fill: impl Fn(usize) -> String,
) -> Vec<String> {
    if queries.len() > count {
        queries.truncate(count);
    } else if queries.len() < count {
        warn!(
            got = queries.len(),
            expected = count,
            "Model returned too few queries, padding"
        );
        while queries.len() < count {
            queries.push(fill(queries.len() + 1));
        }
    }
    queries
}

fn fallback_queries(subject: &str, general_count: usize, academic_count: usize) -> QuerySet {
    QuerySet {
        general: (1..=general_count).map(|i| format!("{subject} {i}")).collect(),
        academic: (1..=academic_count)
            .map(|i| format!("{subject} research {i}"))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    async fn client_returning(server: &mut mockito::Server, answer: &str) -> GeminiClient {
        server
            .mock("POST", mockito::Matcher::Regex(":generateContent".into()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(candidate_body(answer))
            .create_async()
            .await;
        let mut client = GeminiClient::new("key");
        client.set_base_url(server.url());
        client
    }

    #[tokio::test]
    async fn test_fenced_json_is_accepted() {
        let mut server = mockito::Server::new_async().await;
        let answer = "```json\n{\"general\": [\"g1\", \"g2\"], \"academic\": [\"a1\"]}\n```";
        let client = client_returning(&mut server, answer).await;

        let queries = generate_keywords(&client, "fusion", 2, 1).await;
        assert_eq!(queries.general, vec!["g1", "g2"]);
        assert_eq!(queries.academic, vec!["a1"]);
    }

    #[tokio::test]
    async fn test_short_lists_are_padded() {
        let mut server = mockito::Server::new_async().await;
        let answer = r#"{"general": ["only one"], "academic": []}"#;
        let client = client_returning(&mut server, answer).await;

        let queries = generate_keywords(&client, "fusion", 3, 2).await;
        assert_eq!(queries.general, vec!["only one", "fusion 2", "fusion 3"]);
        assert_eq!(
            queries.academic,
            vec!["fusion research paper 1", "fusion research paper 2"]
        );
    }

    #[tokio::test]
    async fn test_long_lists_are_truncated() {
        let mut server = mockito::Server::new_async().await;
        let answer = r#"{"general": ["g1", "g2", "g3"], "academic": ["a1", "a2"]}"#;
        let client = client_returning(&mut server, answer).await;

        let queries = generate_keywords(&client, "fusion", 2, 1).await;
        assert_eq!(queries.general, vec!["g1", "g2"]);
        assert_eq!(queries.academic, vec!["a1"]);
    }

    #[tokio::test]
    async fn test_unparseable_answer_uses_fallback() {
        let mut server = mockito::Server::new_async().await;
        let client = client_returning(&mut server, "I cannot answer in JSON, sorry.").await;

        let queries = generate_keywords(&client, "fusion", 2, 2).await;
        assert_eq!(queries.general, vec!["fusion 1", "fusion 2"]);
        assert_eq!(queries.academic, vec!["fusion research 1", "fusion research 2"]);
    }

    #[tokio::test]
    async fn test_model_failure_uses_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".into()))
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let mut client = GeminiClient::new("key");
        client.set_base_url(server.url());

        let queries = generate_keywords(&client, "fusion", 1, 1).await;
        assert_eq!(queries.general, vec!["fusion 1"]);
        assert_eq!(queries.academic, vec!["fusion research 1"]);
    }
}
