use shelltalk::config::ConfigError;
use shelltalk::dialogue::EngineError;
use shelltalk::error::{AppError, AppResult};
use shelltalk::exec::{ExecutionError, ExecutionResult, ExitError, FailureHints};
use shelltalk::llm::LLMError;
use shelltalk::security::ValidationError;
use std::error::Error;

/// Test that ConfigError converts to AppError::Config
#[test]
fn test_config_error_converts_to_app_error() {
    let app_err: AppError = ConfigError::DirectoryNotFound.into();
    assert!(matches!(app_err, AppError::Config(_)));
}

/// Test that EngineError converts to AppError::Engine
#[test]
fn test_engine_error_converts_to_app_error() {
    let app_err: AppError = EngineError::MissingCredential("ANTHROPIC_API_KEY".to_string()).into();
    assert!(matches!(app_err, AppError::Engine(_)));
    assert!(app_err.to_string().contains("ANTHROPIC_API_KEY"));
}

/// Test that LLMError converts to AppError::Llm
#[test]
fn test_llm_error_converts_to_app_error() {
    let app_err: AppError = LLMError::Timeout.into();
    assert!(matches!(app_err, AppError::Llm(_)));
}

/// Test that ValidationError converts to AppError::Security
#[test]
fn test_validation_error_converts_to_app_error() {
    let app_err: AppError = ValidationError::DisallowedCommand("reboot".to_string()).into();
    assert!(matches!(app_err, AppError::Security(_)));
}

/// Test that ExecutionError converts to AppError::Execution
#[test]
fn test_execution_error_converts_to_app_error() {
    let app_err: AppError = ExecutionError::Timeout.into();
    assert!(matches!(app_err, AppError::Execution(_)));
}

/// Test that io::Error converts to AppError::Io
#[test]
fn test_io_error_converts_to_app_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let app_err: AppError = io_err.into();
    assert!(matches!(app_err, AppError::Io(_)));
}

/// LLM errors wrapped by the engine keep their source
#[test]
fn test_engine_error_keeps_llm_source() {
    let engine_err: EngineError = LLMError::Authentication("bad key".to_string()).into();
    let app_err: AppError = engine_err.into();

    let source = app_err.source().expect("AppError should expose its source");
    assert!(source.to_string().contains("bad key"));
}

/// The ? operator converts module errors
#[test]
fn test_question_mark_operator() {
    fn validate(command: &str) -> AppResult<String> {
        let validator = shelltalk::SafetyValidator::new();
        let validated = validator.validate(command)?;
        Ok(validated.base)
    }

    assert_eq!(validate("ls -la").unwrap(), "ls");
    assert!(matches!(validate("reboot"), Err(AppError::Security(_))));
}

/// Execution results map onto ExecutionError through into_result
#[test]
fn test_execution_result_into_app_error() {
    fn run(result: ExecutionResult) -> AppResult<String> {
        Ok(result.into_result()?)
    }

    let err = run(ExecutionResult::Failure(ExitError {
        code: 2,
        stderr: "boom".to_string(),
    }))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Execution error: Command failed with exit code 2: boom"
    );
}

/// Every AppError variant gets a user-facing explanation
#[test]
fn test_every_variant_has_friendly_message() {
    let errors: Vec<AppError> = vec![
        ConfigError::InvalidValue("bad".to_string()).into(),
        EngineError::MissingCredential("OPENAI_API_KEY".to_string()).into(),
        LLMError::RateLimitExceeded(10).into(),
        ValidationError::EmptyCommand.into(),
        ExecutionError::Rejected("empty command".to_string()).into(),
        std::io::Error::other("disk full").into(),
    ];

    for error in &errors {
        let friendly = FailureHints::explain_app_error(error);
        assert!(!friendly.simple_message.is_empty());
        assert_eq!(friendly.raw_error, error.to_string());
    }
}
