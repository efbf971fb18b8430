// Provider request adapter: one (text, params, credential, provider) tuple
// in, one normalized prompt string out. Exactly one network call per
// invocation; no retry, no caching.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anthropic_client::AnthropicClient;
use crate::gemini_client::GeminiClient;
use crate::openai_client::OpenAiClient;

/// Closed set of supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Chatgpt,
    Anthropic,
    Gemini,
    Deepseek,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::Chatgpt,
        ProviderId::Anthropic,
        ProviderId::Gemini,
        ProviderId::Deepseek,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Chatgpt => "chatgpt",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Gemini => "gemini",
            ProviderId::Deepseek => "deepseek",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },
    #[error("{provider} returned an empty or malformed response")]
    EmptyResponse { provider: &'static str },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub const SYSTEM_INSTRUCTION: &str =
    "You are an assistant that converts video scripts into image generation prompts.";

/// Builds the natural-language instruction sent to every provider.
///
/// The script is divided into one block per estimated minute of narration,
/// with `images_per_minute` prompts per block. Per-prompt word bounds are
/// derived from the 150-200 words-per-minute narration pace, floored.
pub fn build_instruction(text: &str, images_per_minute: u32, estimated_minutes: u32) -> String {
    let words_low = 150 / images_per_minute;
    let words_high = 200 / images_per_minute;

    format!(
        "Divide the following video script into {estimated_minutes} blocks, one block per minute of narration. \
For each block, write {images_per_minute} image prompts describing the visuals for that minute. \
Each prompt must be between {words_low} and {words_high} words long. \
Output plain text only: no markdown, no numbering symbols, no headings. \
Separate blocks with a single blank line.\n\n\
Script:\n{text}"
    )
}

/// Sends the instruction to the selected provider and returns the
/// normalized output string. Any non-success HTTP response or malformed
/// body propagates unchanged; the caller decides what to do with it.
pub async fn process(
    text: &str,
    images_per_minute: u32,
    estimated_minutes: u32,
    provider: ProviderId,
    api_key: &str,
) -> Result<String, ProcessError> {
    let instruction = build_instruction(text, images_per_minute, estimated_minutes);

    match provider {
        ProviderId::Chatgpt => {
            let client = OpenAiClient::chatgpt(api_key.to_string());
            client.complete_chat(SYSTEM_INSTRUCTION, &instruction).await
        }
        ProviderId::Deepseek => {
            let client = OpenAiClient::deepseek(api_key.to_string());
            client.complete_chat(SYSTEM_INSTRUCTION, &instruction).await
        }
        ProviderId::Anthropic => {
            let client = AnthropicClient::new(api_key.to_string());
            client.complete(&instruction).await
        }
        ProviderId::Gemini => {
            let client = GeminiClient::new(api_key.to_string());
            client.generate_content(&instruction).await
        }
    }
}
