// Chat-completions client covering ChatGPT and DeepSeek, which share the
// same request/response shape behind different base URLs and model ids.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::processor::ProcessError;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    pub content: String,
}

impl OpenAiClient {
    pub fn chatgpt(api_key: String) -> Self {
        Self::with_base_url(
            api_key,
            "https://api.openai.com/v1".to_string(),
            "gpt-4o-mini".to_string(),
            "ChatGPT",
        )
    }

    pub fn deepseek(api_key: String) -> Self {
        Self::with_base_url(
            api_key,
            "https://api.deepseek.com/v1".to_string(),
            "deepseek-chat".to_string(),
            "DeepSeek",
        )
    }

    pub fn with_base_url(
        api_key: String,
        base_url: String,
        model: String,
        label: &'static str,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            model,
            label,
        }
    }

    /// One chat-completion round trip: system + user message, temperature
    /// 0.7, first choice's message content back.
    pub async fn complete_chat(&self, system: &str, user: &str) -> Result<String, ProcessError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProcessError::Api {
                provider: self.label,
                status,
                message,
            });
        }

        let data: ChatCompletionResponse = response.json().await?;
        data.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ProcessError::EmptyResponse {
                provider: self.label,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> OpenAiClient {
        OpenAiClient::with_base_url(
            "test-key".to_string(),
            server.uri(),
            "gpt-4o-mini".to_string(),
            "ChatGPT",
        )
    }

    #[tokio::test]
    async fn test_extracts_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "X"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_client(&server)
            .complete_chat("system", "user")
            .await
            .unwrap();
        assert_eq!(result, "X");
    }

    #[tokio::test]
    async fn test_non_success_status_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .complete_chat("system", "user")
            .await
            .unwrap_err();
        match err {
            ProcessError::Api {
                provider, status, ..
            } => {
                assert_eq!(provider, "ChatGPT");
                assert_eq!(status, 401);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .complete_chat("system", "user")
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::EmptyResponse { .. }));
    }
}
