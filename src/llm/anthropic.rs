use crate::llm::client::{
    ClientOptions, DEFAULT_REQUESTS_PER_MINUTE, LLMError, LanguageModelClient, RateLimiter, Turn,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Messages API client
pub struct AnthropicClient {
    api_key: String,
    options: ClientOptions,
    http_client: Client,
    rate_limiter: RateLimiter,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Result<Self, LLMError> {
        Self::with_options(api_key, Self::default_options())
    }

    pub fn with_options(api_key: String, options: ClientOptions) -> Result<Self, LLMError> {
        let http_client = Client::builder().timeout(options.timeout).build()?;
        let rate_limiter = options.rate_limiter();

        Ok(Self {
            api_key,
            options,
            http_client,
            rate_limiter,
        })
    }

    pub fn default_options() -> ClientOptions {
        ClientOptions {
            model: DEFAULT_MODEL.to_string(),
            base_url: ANTHROPIC_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_tokens: 150,
            temperature: 0.3,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.options.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModelClient for AnthropicClient {
    async fn send(&self, transcript: &[Turn], system_instruction: &str) -> Result<String, LLMError> {
        self.rate_limiter.check()?;

        let request_body = AnthropicRequest {
            model: &self.options.model,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
            system: system_instruction,
            messages: transcript
                .iter()
                .map(|turn| Message {
                    role: turn.role.as_str(),
                    content: &turn.text,
                })
                .collect(),
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(LLMError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LLMError::from_status(status, error_text, retry_after));
        }

        let body = response.text().await.map_err(LLMError::from_transport)?;
        let api_response: AnthropicResponse = serde_json::from_str(&body)?;

        api_response
            .content
            .into_iter()
            .find_map(|block| block.text)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| LLMError::InvalidResponse("No text content in response".to_string()))
    }
}
