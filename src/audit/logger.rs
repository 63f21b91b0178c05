use crate::exec::ExecutionResult;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Append-only history of executed and rejected commands
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new AuditLogger with the default log path
    pub fn new() -> std::io::Result<Self> {
        Self::with_path(Self::default_log_path()?)
    }

    /// Create an AuditLogger with a custom log path
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { log_path })
    }

    /// Get the default log path: ~/.config/shelltalk/history.log
    fn default_log_path() -> std::io::Result<PathBuf> {
        let home = std::env::var("HOME").map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "HOME environment variable not set")
        })?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("shelltalk")
            .join("history.log"))
    }

    /// Log the outcome of an execution attempt
    pub fn log_execution(
        &self,
        command: &str,
        working_dir: &Path,
        result: &ExecutionResult,
    ) -> std::io::Result<()> {
        let status = match result {
            ExecutionResult::Success(_) => "exit:0".to_string(),
            ExecutionResult::Failure(err) => format!("exit:{}", err.code),
            ExecutionResult::TimedOut => "TIMEOUT".to_string(),
            ExecutionResult::Rejected(_) => "SAFETY-REJECTED".to_string(),
        };

        let mut entry = format!(
            "[{}] [{}] [{}] [{}] {}",
            Utc::now().to_rfc3339(),
            current_user(),
            working_dir.display(),
            status,
            command
        );
        if let ExecutionResult::Rejected(reason) = result {
            entry.push_str(&format!(" reason=\"{}\"", reason));
        }
        entry.push('\n');

        self.append(&entry)
    }

    /// Log a generated command that the user declined to run
    pub fn log_declined(&self, query: &str, command: &str, working_dir: &Path) -> std::io::Result<()> {
        let entry = format!(
            "[{}] [{}] [{}] [DECLINED] query=\"{}\" command=\"{}\"\n",
            Utc::now().to_rfc3339(),
            current_user(),
            working_dir.display(),
            query,
            command
        );
        self.append(&entry)
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        self.rotate_if_needed()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.write_all(entry.as_bytes())?;
        file.flush()
    }

    /// Rotate log file if it exceeds MAX_LOG_SIZE
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        if !self.log_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_path)?;
        if metadata.len() > MAX_LOG_SIZE {
            // history.log -> history.log.1
            let backup_path = self.log_path.with_extension("log.1");
            fs::rename(&self.log_path, backup_path)?;
        }

        Ok(())
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

fn current_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}
