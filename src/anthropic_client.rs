// Anthropic text completion client (legacy /v1/complete shape: single
// prompt wrapped in role markers, max_tokens_to_sample cap).

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::processor::ProcessError;

const PROVIDER_LABEL: &str = "Anthropic";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens_to_sample: u32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub completion: String,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.anthropic.com".to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            model: "claude-2.1".to_string(),
        }
    }

    /// One completion round trip. The instruction is wrapped in the
    /// Human/Assistant role markers the completion endpoint expects.
    pub async fn complete(&self, instruction: &str) -> Result<String, ProcessError> {
        let url = format!("{}/v1/complete", self.base_url);

        let request_body = CompletionRequest {
            model: self.model.clone(),
            prompt: format!("\n\nHuman: {instruction}\n\nAssistant:"),
            max_tokens_to_sample: 4096,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
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
                provider: PROVIDER_LABEL,
                status,
                message,
            });
        }

        let data: CompletionResponse = response.json().await?;
        Ok(data.completion)
    }
}
