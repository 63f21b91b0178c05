use crate::error::AppError;
use crate::exec::executor::ExecutionResult;

#[derive(Debug, Clone)]
pub struct UserFriendlyError {
    pub simple_message: String,
    pub suggestion: Option<String>,
    pub raw_error: String,
}

/// Plain-language explanations for failed executions
pub struct FailureHints;

impl FailureHints {
    /// Explain a non-successful execution; `None` for success
    pub fn explain(result: &ExecutionResult) -> Option<UserFriendlyError> {
        match result {
            ExecutionResult::Success(_) => None,
            ExecutionResult::Rejected(reason) => Some(UserFriendlyError {
                simple_message: "The command was blocked by the safety filter.".to_string(),
                suggestion: Some(
                    "Only commands from the built-in safe list can run. Try rephrasing the request."
                        .to_string(),
                ),
                raw_error: reason.clone(),
            }),
            ExecutionResult::TimedOut => Some(UserFriendlyError {
                simple_message: "The command took too long and was stopped.".to_string(),
                suggestion: Some(
                    "Try a narrower command, for example limit a search to a smaller directory."
                        .to_string(),
                ),
                raw_error: "timed out".to_string(),
            }),
            ExecutionResult::Failure(err) => {
                let (simple_message, suggestion) = Self::match_stderr_patterns(&err.stderr, err.code);
                Some(UserFriendlyError {
                    simple_message,
                    suggestion,
                    raw_error: err.stderr.trim().to_string(),
                })
            }
        }
    }

    /// Explain an application error for display
    pub fn explain_app_error(error: &AppError) -> UserFriendlyError {
        let (simple_message, suggestion) = match error {
            AppError::Config(_) => (
                "Configuration error occurred.",
                Some("Check your config file at ~/.config/shelltalk/config.toml"),
            ),
            AppError::Engine(_) => (
                "The assistant could not start.",
                Some("Configure an API key or start with --offline"),
            ),
            AppError::Llm(_) => (
                "Error communicating with the language model.",
                Some("Check your API key and network connection"),
            ),
            AppError::Security(_) => ("Command validation failed for security reasons.", None),
            AppError::Execution(_) => ("The command did not complete.", None),
            AppError::Io(_) => (
                "I/O error occurred.",
                Some("Check file permissions and disk space"),
            ),
        };

        UserFriendlyError {
            simple_message: simple_message.to_string(),
            suggestion: suggestion.map(str::to_string),
            raw_error: error.to_string(),
        }
    }

    fn match_stderr_patterns(stderr: &str, code: i32) -> (String, Option<String>) {
        let lower = stderr.to_lowercase();

        if lower.contains("command not found") || code == 127 {
            return (
                "The program is not installed or not on your PATH.".to_string(),
                Some("Install it with your package manager, or check the spelling.".to_string()),
            );
        }

        if lower.contains("permission denied") || lower.contains("operation not permitted") {
            return (
                "You don't have permission to do that.".to_string(),
                Some("Check the file permissions with ls -l.".to_string()),
            );
        }

        if lower.contains("no such file or directory") {
            return (
                "A file or directory in the command doesn't exist.".to_string(),
                Some("Check the path with ls or pwd.".to_string()),
            );
        }

        if lower.contains("is a directory") {
            return (
                "The command expected a file but got a directory.".to_string(),
                Some("Add -r for recursive operation, or pick a file inside it.".to_string()),
            );
        }

        if lower.contains("not a directory") {
            return (
                "Part of the path is a file, not a directory.".to_string(),
                None,
            );
        }

        if lower.contains("could not resolve host")
            || lower.contains("name or service not known")
            || lower.contains("temporary failure in name resolution")
        {
            return (
                "The host name could not be resolved.".to_string(),
                Some("Check the address and your network connection.".to_string()),
            );
        }

        if lower.contains("connection refused") {
            return (
                "The remote side refused the connection.".to_string(),
                Some("Check that the service is running and the port is right.".to_string()),
            );
        }

        if lower.contains("file exists") {
            return ("That file or directory already exists.".to_string(), None);
        }

        // grep and diff use exit code 1 for "nothing matched" with empty stderr
        if code == 1 && lower.trim().is_empty() {
            return ("The command found nothing to report.".to_string(), None);
        }

        (format!("The command exited with code {}.", code), None)
    }
}
