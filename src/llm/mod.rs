pub mod anthropic;
pub mod client;
pub mod openai;
pub mod reply;

pub use anthropic::AnthropicClient;
pub use client::{
    ClientOptions, DEFAULT_REQUESTS_PER_MINUTE, LLMError, LanguageModelClient, Role, Turn,
};
pub use openai::OpenAIClient;
pub use reply::{CommandReply, parse_casual_reply, parse_command_reply};

use crate::config::{LLMConfig, Provider};

/// Build the client for the configured provider
pub fn build_client(
    config: &LLMConfig,
    api_key: String,
) -> Result<Box<dyn LanguageModelClient>, LLMError> {
    let base_url = config.base_url.clone().unwrap_or_else(|| match config.provider {
        Provider::Anthropic => anthropic::ANTHROPIC_API_URL.to_string(),
        Provider::OpenAI => openai::OPENAI_API_URL.to_string(),
    });

    let options = ClientOptions {
        model: config.model.clone(),
        base_url,
        timeout: config.timeout(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        requests_per_minute: config.requests_per_minute,
    };

    let client: Box<dyn LanguageModelClient> = match config.provider {
        Provider::Anthropic => Box::new(AnthropicClient::with_options(api_key, options)?),
        Provider::OpenAI => Box::new(OpenAIClient::with_options(api_key, options)?),
    };

    Ok(client)
}
