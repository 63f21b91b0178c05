pub mod audit;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod exec;
pub mod llm;
pub mod security;
pub mod shell;

// Re-export commonly used types for convenience
pub use config::Config;
pub use dialogue::{DialogueEngine, EngineOptions, GenerationOutcome};
pub use error::{AppError, AppResult};
pub use exec::{CommandExecutor, ExecutionResult};
pub use security::{SafetyValidator, SafetyVerdict};
pub use shell::InteractiveShell;
