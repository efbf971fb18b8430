// Process-wide configuration, loaded once from the environment in main.
// Every credential is optional: an absent entry disables the feature it
// backs rather than failing startup.

use crate::processor::ProviderId;

#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub chatgpt: Option<String>,
    pub anthropic: Option<String>,
    pub gemini: Option<String>,
    pub deepseek: Option<String>,
}

impl ProviderCredentials {
    pub fn from_env() -> Self {
        Self {
            chatgpt: non_empty_env("OPENAI_API_KEY"),
            anthropic: non_empty_env("ANTHROPIC_API_KEY"),
            gemini: non_empty_env("GEMINI_API_KEY"),
            deepseek: non_empty_env("DEEPSEEK_API_KEY"),
        }
    }

    pub fn key_for(&self, provider: ProviderId) -> Option<&str> {
        match provider {
            ProviderId::Chatgpt => self.chatgpt.as_deref(),
            ProviderId::Anthropic => self.anthropic.as_deref(),
            ProviderId::Gemini => self.gemini.as_deref(),
            ProviderId::Deepseek => self.deepseek.as_deref(),
        }
    }

    /// Providers offered to clients. Availability is purely "a credential
    /// is present", never a mutable flag.
    pub fn enabled(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|provider| self.key_for(*provider).is_some())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Limits {
    /// Hard ceiling on script word count.
    pub word_limit: usize,
    /// Ceiling applied when the requesting user has no active subscription.
    pub free_tier_word_limit: usize,
    /// Upper bound on images per minute of narration.
    pub max_images_per_minute: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            word_limit: 10_000,
            free_tier_word_limit: 500,
            max_images_per_minute: 10,
        }
    }
}

impl Limits {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            word_limit: parse_env("WORD_LIMIT", defaults.word_limit),
            free_tier_word_limit: parse_env("FREE_TIER_WORD_LIMIT", defaults.free_tier_word_limit),
            max_images_per_minute: defaults.max_images_per_minute,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub price_id: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutConfig {
    pub fn from_env() -> Self {
        Self {
            price_id: non_empty_env("STRIPE_PRICE_ID"),
            success_url: std::env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|_| "http://localhost:3000/?checkout=success".to_string()),
            cancel_url: std::env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|_| "http://localhost:3000/?checkout=cancelled".to_string()),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_credential_disables_provider() {
        let credentials = ProviderCredentials {
            chatgpt: Some("sk-test".to_string()),
            anthropic: None,
            gemini: Some("g-test".to_string()),
            deepseek: None,
        };
        assert_eq!(
            credentials.enabled(),
            vec![ProviderId::Chatgpt, ProviderId::Gemini]
        );
        assert_eq!(credentials.key_for(ProviderId::Anthropic), None);
        assert_eq!(credentials.key_for(ProviderId::Chatgpt), Some("sk-test"));
    }

    #[test]
    fn test_no_credentials_means_no_providers() {
        let credentials = ProviderCredentials::default();
        assert!(credentials.enabled().is_empty());
    }

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.word_limit, 10_000);
        assert_eq!(limits.free_tier_word_limit, 500);
        assert_eq!(limits.max_images_per_minute, 10);
    }
}
