use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// How a spawned process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Exited {
        code: i32,
        stdout: String,
        stderr: String,
    },
    TimedOut,
}

/// Spawns one shell command and waits for it, bounded by a timeout
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &str, timeout: Duration) -> io::Result<ProcessOutcome>;
}

/// Runs commands through the platform shell
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    working_dir: Option<PathBuf>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run commands from a fixed directory instead of the process cwd
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            working_dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    fn shell_command(command: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

#[async_trait]
impl ProcessRunner for ShellRunner {
    async fn run(&self, command: &str, timeout: Duration) -> io::Result<ProcessOutcome> {
        let mut cmd = Self::shell_command(command);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so children of the shell die with it
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn()?;

        #[cfg(unix)]
        let mut group = ProcessGroup::new(child.id());

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                #[cfg(unix)]
                group.release();

                Ok(ProcessOutcome::Exited {
                    code: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(command, ?timeout, "command timed out; killing process group");
                Ok(ProcessOutcome::TimedOut)
            }
        }
    }
}

/// Kills a process group on drop unless released
///
/// Covers both the timeout path and a caller dropping the `run` future.
#[cfg(unix)]
struct ProcessGroup {
    pgid: Option<libc::pid_t>,
}

#[cfg(unix)]
impl ProcessGroup {
    fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid.and_then(|pid| libc::pid_t::try_from(pid).ok()),
        }
    }

    fn release(&mut self) {
        self.pgid = None;
    }
}

#[cfg(unix)]
impl Drop for ProcessGroup {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            // SAFETY: killpg only sends a signal; a stale group id yields ESRCH
            unsafe {
                libc::killpg(pgid, libc::SIGKILL);
            }
        }
    }
}
