use crate::exec::runner::{ProcessOutcome, ProcessRunner, ShellRunner};
use crate::security::SafetyValidator;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit status and stderr of a command that exited non-zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitError {
    pub code: i32,
    pub stderr: String,
}

/// Result of one execution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Success(String),
    Failure(ExitError),
    TimedOut,
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Command rejected by safety filter: {0}")]
    Rejected(String),

    #[error("Command timed out")]
    Timeout,

    #[error("Command failed with exit code {code}: {stderr}")]
    Failed { code: i32, stderr: String },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success(_))
    }

    /// Exit code for the audit log, if the process ran to completion
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecutionResult::Success(_) => Some(0),
            ExecutionResult::Failure(err) => Some(err.code),
            ExecutionResult::TimedOut | ExecutionResult::Rejected(_) => None,
        }
    }

    pub fn into_result(self) -> Result<String, ExecutionError> {
        match self {
            ExecutionResult::Success(stdout) => Ok(stdout),
            ExecutionResult::Failure(ExitError { code, stderr }) => {
                Err(ExecutionError::Failed { code, stderr })
            }
            ExecutionResult::TimedOut => Err(ExecutionError::Timeout),
            ExecutionResult::Rejected(reason) => Err(ExecutionError::Rejected(reason)),
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionResult::Success(_) => write!(f, "success"),
            ExecutionResult::Failure(err) => write!(f, "exit code {}", err.code),
            ExecutionResult::TimedOut => write!(f, "timed out"),
            ExecutionResult::Rejected(reason) => write!(f, "rejected: {}", reason),
        }
    }
}

/// Runs commands that pass the safety filter
///
/// Validation is repeated on every call, whatever the caller checked before.
/// The executor holds no mutable state and may be shared across tasks.
pub struct CommandExecutor {
    validator: SafetyValidator,
    runner: Box<dyn ProcessRunner>,
    timeout: Duration,
}

impl CommandExecutor {
    /// Executor that runs commands in the current directory
    pub fn new() -> Self {
        Self::with_runner(Box::new(ShellRunner::new()))
    }

    /// Executor that runs commands from `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::with_runner(Box::new(ShellRunner::in_dir(dir)))
    }

    pub fn with_runner(runner: Box<dyn ProcessRunner>) -> Self {
        Self {
            validator: SafetyValidator::new(),
            runner,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn validator(&self) -> &SafetyValidator {
        &self.validator
    }

    /// Validate and run a command
    pub async fn execute(&self, command: &str) -> ExecutionResult {
        let verdict = self.validator.check(command);
        if !verdict.permitted {
            info!(command, reason = %verdict.reason, "command rejected");
            return ExecutionResult::Rejected(verdict.reason);
        }

        debug!(command, timeout = ?self.timeout, "running command");
        match self.runner.run(command, self.timeout).await {
            Ok(ProcessOutcome::Exited { code: 0, stdout, .. }) => ExecutionResult::Success(stdout),
            Ok(ProcessOutcome::Exited { code, stderr, .. }) => {
                ExecutionResult::Failure(ExitError { code, stderr })
            }
            Ok(ProcessOutcome::TimedOut) => ExecutionResult::TimedOut,
            Err(e) => {
                warn!(command, error = %e, "failed to spawn shell");
                ExecutionResult::Failure(ExitError {
                    code: -1,
                    stderr: format!("Failed to start shell: {}", e),
                })
            }
        }
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}
