// Gemini generateContent client. The API key travels as a query
// parameter, not a header.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::processor::ProcessError;

const PROVIDER_LABEL: &str = "Gemini";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(
            api_key,
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
        )
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            model: "gemini-2.5-flash".to_string(),
        }
    }

    /// One generateContent round trip with a single text part; returns
    /// the first candidate's first part.
    pub async fn generate_content(&self, instruction: &str) -> Result<String, ProcessError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: instruction.to_string(),
                }],
            }],
        };

        let response = self.client.post(&url).json(&request_body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProcessError::Api {
                provider: PROVIDER_LABEL,
                status,
                message,
            });
        }

        let data: GenerateContentResponse = response.json().await?;
        data.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(ProcessError::EmptyResponse {
                provider: PROVIDER_LABEL,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_extracts_first_candidate_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "X"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url("test-key".to_string(), server.uri());
        let result = client.generate_content("instruction").await.unwrap();
        assert_eq!(result, "X");
    }

    #[tokio::test]
    async fn test_blocked_prompt_without_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url("test-key".to_string(), server.uri());
        let err = client.generate_content("instruction").await.unwrap_err();
        assert!(matches!(err, ProcessError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn test_invalid_key_propagates_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url("bad-key".to_string(), server.uri());
        let err = client.generate_content("instruction").await.unwrap_err();
        assert!(matches!(err, ProcessError::Api { status: 400, .. }));
    }
}
