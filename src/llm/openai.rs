use crate::llm::client::{
    ClientOptions, DEFAULT_REQUESTS_PER_MINUTE, LLMError, LanguageModelClient, RateLimiter, Turn,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat Completions API client
///
/// The system instruction travels as a leading `system` message rather than a
/// dedicated request field.
pub struct OpenAIClient {
    api_key: String,
    options: ClientOptions,
    http_client: Client,
    rate_limiter: RateLimiter,
}

impl OpenAIClient {
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
            base_url: OPENAI_API_URL.to_string(),
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
        format!(
            "{}/v1/chat/completions",
            self.options.base_url.trim_end_matches('/')
        )
    }

    fn build_messages<'a>(transcript: &'a [Turn], system_instruction: &'a str) -> Vec<ChatMessage<'a>> {
        std::iter::once(ChatMessage {
            role: "system",
            content: system_instruction,
        })
        .chain(transcript.iter().map(|turn| ChatMessage {
            role: turn.role.as_str(),
            content: &turn.text,
        }))
        .collect()
    }
}

#[async_trait]
impl LanguageModelClient for OpenAIClient {
    async fn send(&self, transcript: &[Turn], system_instruction: &str) -> Result<String, LLMError> {
        self.rate_limiter.check()?;

        let request_body = ChatRequest {
            model: &self.options.model,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
            messages: Self::build_messages(transcript, system_instruction),
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
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
        let chat: ChatResponse = serde_json::from_str(&body)?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| LLMError::InvalidResponse("No choices in response".to_string()))
    }
}
