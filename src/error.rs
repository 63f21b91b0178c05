use std::io;
use thiserror::Error;

use crate::config::settings::ConfigError;
use crate::dialogue::engine::EngineError;
use crate::exec::executor::ExecutionError;
use crate::llm::client::LLMError;
use crate::security::validator::ValidationError;

/// Top-level application error that wraps all module-specific errors
///
/// Module errors convert into `AppError` via `From`, so application code can
/// use `?` across module boundaries without losing the specific cause.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("LLM error: {0}")]
    Llm(#[from] LLMError),

    #[error("Security validation error: {0}")]
    Security(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
