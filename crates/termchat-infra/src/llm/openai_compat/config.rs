//! Configuration for the OpenAI-compatible provider.

use std::time::Duration;

use secrecy::SecretString;

use termchat_types::config::ChatConfig;

use crate::secret::env::Credentials;

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    /// API key for authentication.
    pub api_key: SecretString,
    /// Sent as the `OpenAI-Organization` header when set.
    pub organization: Option<String>,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

/// OpenAI default configuration.
///
/// Base URL: `https://api.openai.com/v1`, 60 second timeout.
pub fn openai_defaults(credentials: Credentials) -> OpenAiCompatConfig {
    let defaults = ChatConfig::default();
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: defaults.base_url.clone(),
        api_key: credentials.api_key,
        organization: Some(credentials.organization),
        timeout: defaults.timeout(),
    }
}

/// Configuration built from a loaded [`ChatConfig`]: its base URL and
/// timeout, plus the environment credentials. The model travels with each
/// request instead.
pub fn from_chat_config(chat: &ChatConfig, credentials: Credentials) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        base_url: chat.base_url.clone(),
        timeout: chat.timeout(),
        ..openai_defaults(credentials)
    }
}
