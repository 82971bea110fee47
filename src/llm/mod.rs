//! LLM integration for BlueQuery.
//!
//! Provides the chat-completions client used for natural-language-to-SQL
//! translation, result refinement, and general oceanography answers.

mod chat;
mod mock;
mod prompt;
mod translator;
mod types;

pub use chat::ChatClient;
pub use mock::{FailingLlmClient, MockLlmClient};
pub use prompt::{
    general_messages, refine_messages, translate_messages, GENERAL_SYSTEM_PROMPT,
    GENERAL_TEMPERATURE, REFINE_SYSTEM_PROMPT, REFINE_TEMPERATURE, TRANSLATE_SYSTEM_PROMPT,
    TRANSLATE_TEMPERATURE,
};
pub use translator::{strip_code_fences, translate_to_sql};
pub use types::{Message, Role};

use async_trait::async_trait;

use crate::config::{LlmConfig, ProviderChoice, ProviderSettings};
use crate::error::Result;

/// Trait for chat-completions clients.
///
/// Implementations must be thread-safe (Send + Sync) to support async
/// operations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given messages.
    ///
    /// Returns the assistant's reply with surrounding whitespace trimmed.
    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String>;
}

/// The provider this process sends requests to, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveProvider {
    /// Groq's OpenAI-compatible endpoint.
    Groq,
    /// xAI's Grok endpoint.
    Grok,
}

impl ActiveProvider {
    /// Returns the provider as a string for health reporting.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Grok => "grok",
        }
    }

    /// Returns the settings block for this provider.
    pub fn settings<'a>(&self, config: &'a LlmConfig) -> &'a ProviderSettings {
        match self {
            Self::Groq => &config.groq,
            Self::Grok => &config.grok,
        }
    }
}

impl std::fmt::Display for ActiveProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolves which provider this process talks to.
///
/// `auto` picks the first provider with a credential, preferring Groq. A
/// forced provider is honored even when its credential is missing; its
/// requests are then rejected upstream and the service degrades to local
/// answers.
pub fn resolve_provider(config: &LlmConfig) -> Option<ActiveProvider> {
    match config.provider {
        ProviderChoice::Auto => {
            if !config.groq.api_key.is_empty() {
                Some(ActiveProvider::Groq)
            } else if !config.grok.api_key.is_empty() {
                Some(ActiveProvider::Grok)
            } else {
                None
            }
        }
        ProviderChoice::Groq => Some(ActiveProvider::Groq),
        ProviderChoice::Grok => Some(ActiveProvider::Grok),
        ProviderChoice::Disabled => None,
    }
}

/// Builds the HTTP client for the resolved provider.
pub fn build_client(provider: ActiveProvider, config: &LlmConfig) -> Result<ChatClient> {
    ChatClient::new(provider.settings(config).clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_keys(provider: ProviderChoice, groq_key: &str, grok_key: &str) -> LlmConfig {
        let mut config = LlmConfig::default();
        config.provider = provider;
        config.groq.api_key = groq_key.to_string();
        config.grok.api_key = grok_key.to_string();
        config
    }

    #[test]
    fn test_auto_prefers_groq() {
        let config = config_with_keys(ProviderChoice::Auto, "gsk-test", "xai-test");
        assert_eq!(resolve_provider(&config), Some(ActiveProvider::Groq));
    }

    #[test]
    fn test_auto_falls_back_to_grok() {
        let config = config_with_keys(ProviderChoice::Auto, "", "xai-test");
        assert_eq!(resolve_provider(&config), Some(ActiveProvider::Grok));
    }

    #[test]
    fn test_auto_without_keys_resolves_none() {
        let config = config_with_keys(ProviderChoice::Auto, "", "");
        assert_eq!(resolve_provider(&config), None);
    }

    #[test]
    fn test_forced_provider_wins_over_other_key() {
        let config = config_with_keys(ProviderChoice::Grok, "gsk-test", "xai-test");
        assert_eq!(resolve_provider(&config), Some(ActiveProvider::Grok));
    }

    #[test]
    fn test_forced_provider_kept_without_credential() {
        let config = config_with_keys(ProviderChoice::Groq, "", "xai-test");
        assert_eq!(resolve_provider(&config), Some(ActiveProvider::Groq));
    }

    #[test]
    fn test_disabled_resolves_none() {
        let config = config_with_keys(ProviderChoice::Disabled, "gsk-test", "xai-test");
        assert_eq!(resolve_provider(&config), None);
    }

    #[test]
    fn test_active_provider_as_str() {
        assert_eq!(ActiveProvider::Groq.as_str(), "groq");
        assert_eq!(ActiveProvider::Grok.as_str(), "grok");
        assert_eq!(format!("{}", ActiveProvider::Grok), "grok");
    }

    #[test]
    fn test_settings_selects_matching_block() {
        let config = config_with_keys(ProviderChoice::Auto, "gsk-test", "xai-test");
        assert_eq!(ActiveProvider::Groq.settings(&config).api_key, "gsk-test");
        assert_eq!(ActiveProvider::Grok.settings(&config).api_key, "xai-test");
    }
}
