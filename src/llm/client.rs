use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded, retry after {0}s")]
    RateLimitExceeded(u64),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

const AUTH_FAILURE_PATTERNS: &[&str] = &[
    "authentication",
    "unauthorized",
    "invalid api key",
    "invalid x-api-key",
    "incorrect api key",
    "status 401",
    "status 403",
];

impl LLMError {
    /// Whether this failure means the credential itself is bad
    ///
    /// Retrying with the same key cannot succeed once this is true.
    pub fn is_authentication_failure(&self) -> bool {
        match self {
            LLMError::Authentication(_) => true,
            LLMError::ApiError(msg) | LLMError::InvalidResponse(msg) => {
                let lower = msg.to_lowercase();
                AUTH_FAILURE_PATTERNS.iter().any(|p| lower.contains(p))
            }
            _ => false,
        }
    }

    /// Map a reqwest failure, keeping client-side timeouts distinct
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout
        } else {
            LLMError::NetworkError(err)
        }
    }

    /// Map a non-success HTTP status to an error
    pub(crate) fn from_status(status: StatusCode, body: String, retry_after: Option<u64>) -> Self {
        match status.as_u16() {
            401 | 403 => LLMError::Authentication(format!("status {}: {}", status, body)),
            429 => LLMError::RateLimitExceeded(retry_after.unwrap_or(60)),
            _ => LLMError::ApiError(format!("API returned status {}: {}", status, body)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of a conversation transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// A remote model that answers a transcript under a system instruction
///
/// Implementations are stateless per request; conversation memory lives with
/// the caller.
#[async_trait]
pub trait LanguageModelClient: Send + Sync {
    async fn send(&self, transcript: &[Turn], system_instruction: &str) -> Result<String, LLMError>;
}

/// Sliding-window request limiter shared by the HTTP clients
///
/// Rejects instead of waiting, so a caller never blocks on it.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    request_times: Mutex<Vec<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            request_times: Mutex::new(Vec::new()),
        }
    }

    /// Record a request, or report how long until one is allowed
    pub fn check(&self) -> Result<(), LLMError> {
        let now = Instant::now();
        let mut times = self
            .request_times
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        times.retain(|&time| now.duration_since(time) < self.window);

        if times.len() >= self.max_requests {
            let oldest = times[0];
            let wait_time = self.window.saturating_sub(now.duration_since(oldest));
            return Err(LLMError::RateLimitExceeded(wait_time.as_secs()));
        }

        times.push(now);
        Ok(())
    }
}

/// Per-client request settings
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Local cap on `send` calls per minute; a command turn costs two
    pub requests_per_minute: usize,
}

/// Room for about fifteen command turns a minute
pub const DEFAULT_REQUESTS_PER_MINUTE: usize = 30;

impl ClientOptions {
    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.requests_per_minute, Duration::from_secs(60))
    }
}
