use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use crate::security::{DANGEROUS_COMMANDS, SAFE_COMMANDS, SAFE_TEST_FLAGS};

const SAFE_REASON: &str = "command is safe";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty command")]
    EmptyCommand,

    #[error("malformed command: {0}")]
    MalformedCommand(String),

    #[error("command '{0}' is in the dangerous commands list")]
    DangerousCommand(String),

    #[error("command '{0}' is not in the safe commands list")]
    DisallowedCommand(String),

    #[error("unsafe argument '{0}' for test command")]
    UnsafeTestFlag(String),
}

/// A command that passed validation, split into shell words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCommand {
    pub command: String,
    pub base: String,
    pub args: Vec<String>,
}

/// Permit/reject decision with a human-readable reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyVerdict {
    pub permitted: bool,
    pub reason: String,
}

impl SafetyVerdict {
    fn permit() -> Self {
        Self {
            permitted: true,
            reason: SAFE_REASON.to_string(),
        }
    }

    fn reject(error: &ValidationError) -> Self {
        Self {
            permitted: false,
            reason: error.to_string(),
        }
    }
}

impl fmt::Display for SafetyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.permitted { "permitted" } else { "rejected" };
        write!(f, "{}: {}", label, self.reason)
    }
}

/// Static allowlist/denylist filter for candidate commands
///
/// Holds no mutable state; every call is a pure function of the input and the
/// compiled-in policy sets, so one instance can be shared freely.
#[derive(Debug, Clone)]
pub struct SafetyValidator {
    safe_commands: HashSet<&'static str>,
    safe_test_flags: HashSet<&'static str>,
    dangerous_commands: HashSet<&'static str>,
}

impl SafetyValidator {
    pub fn new() -> Self {
        Self {
            safe_commands: SAFE_COMMANDS.iter().copied().collect(),
            safe_test_flags: SAFE_TEST_FLAGS.iter().copied().collect(),
            dangerous_commands: DANGEROUS_COMMANDS.iter().copied().collect(),
        }
    }

    /// Validate a command line
    pub fn validate(&self, command: &str) -> Result<ValidatedCommand, ValidationError> {
        let tokens = shell_words::split(command)
            .map_err(|e| ValidationError::MalformedCommand(e.to_string()))?;

        let Some((base, args)) = tokens.split_first() else {
            return Err(ValidationError::EmptyCommand);
        };

        // Exact match on the raw string, checked before the allowlist
        if self.dangerous_commands.contains(command) {
            return Err(ValidationError::DangerousCommand(command.to_string()));
        }

        if !self.safe_commands.contains(base.as_str()) {
            return Err(ValidationError::DisallowedCommand(base.clone()));
        }

        if base == "test" {
            self.check_test_flags(args)?;
        }

        Ok(ValidatedCommand {
            command: command.to_string(),
            base: base.clone(),
            args: args.to_vec(),
        })
    }

    /// Same decision as [`validate`](Self::validate), as a verdict value
    pub fn check(&self, command: &str) -> SafetyVerdict {
        match self.validate(command) {
            Ok(_) => SafetyVerdict::permit(),
            Err(e) => SafetyVerdict::reject(&e),
        }
    }

    pub fn is_safe(&self, command: &str) -> bool {
        self.validate(command).is_ok()
    }

    fn check_test_flags(&self, args: &[String]) -> Result<(), ValidationError> {
        for arg in args {
            if arg.starts_with('-') && !self.safe_test_flags.contains(arg.as_str()) {
                return Err(ValidationError::UnsafeTestFlag(arg.clone()));
            }
        }
        Ok(())
    }
}

impl Default for SafetyValidator {
    fn default() -> Self {
        Self::new()
    }
}
