//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](termchat_core::llm::provider::LlmProvider)
//! implementation for OpenAI-compatible endpoints and a factory
//! ([`create_provider`]) that builds it from the loaded configuration.

pub mod openai_compat;

use termchat_core::llm::box_provider::BoxLlmProvider;
use termchat_types::config::ChatConfig;
use termchat_types::llm::LlmError;

use crate::secret::env::Credentials;

use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] for the configured endpoint.
pub fn create_provider(
    config: &ChatConfig,
    credentials: Credentials,
) -> Result<BoxLlmProvider, LlmError> {
    let oai_config = openai_compat::config::from_chat_config(config, credentials);
    tracing::debug!(
        provider = %oai_config.provider_name,
        base_url = %oai_config.base_url,
        model = %config.model,
        timeout_secs = oai_config.timeout.as_secs(),
        "Creating LLM provider"
    );
    let provider = OpenAiCompatibleProvider::new(oai_config)?;
    Ok(BoxLlmProvider::new(provider))
}
