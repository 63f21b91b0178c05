pub mod executor;
pub mod hints;
pub mod runner;

pub use executor::{CommandExecutor, ExecutionError, ExecutionResult, ExitError, DEFAULT_TIMEOUT};
pub use hints::{FailureHints, UserFriendlyError};
pub use runner::{ProcessOutcome, ProcessRunner, ShellRunner};
