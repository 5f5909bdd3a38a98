//! LLM relevance gate for academic papers.

use crate::gemini::GeminiClient;
use crate::prompts::relevance;
use tracing::{debug, warn};

/// Ask the model whether a paper is relevant to the research subject.
///
/// Papers with an empty abstract are rejected without calling the model.
/// The answer is relevant iff it contains "YES" in any casing; a failed
/// call drops the paper rather than aborting the round.
pub async fn check_relevance(
    client: &GeminiClient,
    subject: &str,
    title: &str,
    abstract_text: &str,
) -> bool {
    if abstract_text.trim().is_empty() {
        debug!(title, "Skipping relevance check, no abstract");
        return false;
    }

    let user_prompt = relevance::build_user_prompt(subject, title, abstract_text);
    match client.generate(relevance::SYSTEM_PROMPT, &user_prompt).await {
        Ok(answer) => answer.to_lowercase().contains("yes"),
        Err(e) => {
            warn!(error = %e, title, "Relevance check failed, dropping paper");
            false
        }
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

    async fn client_against(server: &mockito::Server) -> GeminiClient {
        let mut client = GeminiClient::new("test-key");
        client.set_base_url(server.url());
        client
    }

    #[tokio::test]
    async fn test_yes_answer_is_relevant() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".into()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(candidate_body("yes, clearly relevant"))
            .create_async()
            .await;

        let client = client_against(&server).await;
        assert!(check_relevance(&client, "topic", "title", "an abstract").await);
    }

    #[tokio::test]
    async fn test_no_answer_is_not_relevant() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".into()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(candidate_body("NO"))
            .create_async()
            .await;

        let client = client_against(&server).await;
        assert!(!check_relevance(&client, "topic", "title", "an abstract").await);
    }

    #[tokio::test]
    async fn test_empty_abstract_makes_no_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".into()))
            .match_query(mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_against(&server).await;
        assert!(!check_relevance(&client, "topic", "title", "   ").await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_model_error_is_not_relevant() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".into()))
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;

        let client = client_against(&server).await;
        assert!(!check_relevance(&client, "topic", "title", "an abstract").await);
    }
}
