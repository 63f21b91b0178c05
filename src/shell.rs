use crate::audit::AuditLogger;
use crate::dialogue::{DialogueEngine, GenerationOutcome};
use crate::error::AppResult;
use crate::exec::{CommandExecutor, ExecutionResult, FailureHints};
use crossterm::style::Stylize;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, warn};

const EXIT_TOKENS: &[&str] = &["exit", "quit"];

const EMPTY_OUTCOME_MESSAGE: &str =
    "I couldn't turn that into a safe command. Try describing it differently.";

/// Whether the line ends the session
pub fn is_exit_token(line: &str) -> bool {
    let line = line.trim();
    EXIT_TOKENS.iter().any(|token| line.eq_ignore_ascii_case(token))
}

/// Whether a confirmation answer means yes
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Line(String),
    Interrupted,
    Closed,
}

/// Read one line unless `interrupt` completes first
async fn read_input<R, F>(lines: &mut Lines<R>, interrupt: F) -> AppResult<Input>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = io::Result<()>>,
{
    tokio::select! {
        line = lines.next_line() => Ok(line?.map_or(Input::Closed, Input::Line)),
        _ = interrupt => Ok(Input::Interrupted),
    }
}

/// Next line at a prompt; Ctrl-C ends the prompt line and reports `Interrupted`
async fn next_input<R, W>(lines: &mut Lines<R>, out: &mut W) -> AppResult<Input>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let input = read_input(lines, tokio::signal::ctrl_c()).await?;
    if input == Input::Interrupted {
        writeln!(out)?;
    }
    Ok(input)
}

/// Line-oriented session loop
///
/// Reads requests, hands them to the dialogue engine, and runs the commands
/// it produces after confirmation. Ctrl-C at any prompt, while waiting on the
/// model, or during a running command cancels that step and returns to the
/// main prompt.
pub struct InteractiveShell {
    engine: DialogueEngine,
    executor: CommandExecutor,
    audit: Option<AuditLogger>,
    confirm: bool,
    working_dir: PathBuf,
}

impl InteractiveShell {
    pub fn new(engine: DialogueEngine, executor: CommandExecutor, working_dir: PathBuf) -> Self {
        Self {
            engine,
            executor,
            audit: None,
            confirm: true,
            working_dir,
        }
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_confirmation(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn engine(&self) -> &DialogueEngine {
        &self.engine
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run the session until an exit token or end of input
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        self.print_banner(out)?;

        loop {
            prompt(out, "> ")?;
            let line = match next_input(&mut lines, out).await? {
                Input::Line(line) => line,
                Input::Interrupted => continue,
                Input::Closed => {
                    writeln!(out)?;
                    break;
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if is_exit_token(line) {
                break;
            }

            if self.handle_request(line, &mut lines, out).await? == Flow::Exit {
                break;
            }
        }

        writeln!(out, "{}", "Goodbye!".dim())?;
        Ok(())
    }

    fn print_banner<W: Write>(&self, out: &mut W) -> AppResult<()> {
        let mode = if self.engine.is_offline() {
            " [offline]"
        } else {
            ""
        };
        writeln!(
            out,
            "{}{}",
            "shelltalk".bold().cyan(),
            mode.yellow()
        )?;
        writeln!(
            out,
            "Describe what you want to do in {}. Type 'exit' to quit.",
            self.working_dir.display()
        )?;
        Ok(())
    }

    async fn handle_request<R, W>(
        &mut self,
        query: &str,
        lines: &mut Lines<R>,
        out: &mut W,
    ) -> AppResult<Flow>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut utterance = query.to_string();

        loop {
            let outcome = tokio::select! {
                outcome = self.engine.respond(&utterance) => outcome,
                _ = tokio::signal::ctrl_c() => {
                    writeln!(out, "{}", "Cancelled.".yellow())?;
                    return Ok(Flow::Continue);
                }
            };
            debug!(%outcome, "dialogue outcome");

            match outcome {
                GenerationOutcome::Question(question) => {
                    writeln!(out, "{}", question.as_str().cyan())?;
                    let answer = loop {
                        prompt(out, "? ")?;
                        match next_input(lines, out).await? {
                            Input::Line(answer) if answer.trim().is_empty() => continue,
                            Input::Line(answer) => break answer,
                            Input::Interrupted => {
                                writeln!(out, "{}", "Cancelled.".yellow())?;
                                return Ok(Flow::Continue);
                            }
                            Input::Closed => return Ok(Flow::Exit),
                        }
                    };
                    if is_exit_token(&answer) {
                        return Ok(Flow::Exit);
                    }
                    utterance = answer.trim().to_string();
                }
                GenerationOutcome::CasualReply(reply) => {
                    writeln!(out, "{}", reply)?;
                    return Ok(Flow::Continue);
                }
                GenerationOutcome::Empty => {
                    writeln!(out, "{}", EMPTY_OUTCOME_MESSAGE.yellow())?;
                    return Ok(Flow::Continue);
                }
                GenerationOutcome::Command(command) => {
                    return self.handle_command(query, &command, lines, out).await;
                }
            }
        }
    }

    async fn handle_command<R, W>(
        &mut self,
        query: &str,
        command: &str,
        lines: &mut Lines<R>,
        out: &mut W,
    ) -> AppResult<Flow>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "{} {}", "Command:".bold(), command.green())?;

        // Show the rejection before asking, the executor checks again anyway
        let verdict = self.executor.validator().check(command);
        if !verdict.permitted {
            let result = ExecutionResult::Rejected(verdict.reason);
            self.record(command, &result);
            report(&result, out)?;
            return Ok(Flow::Continue);
        }

        if self.confirm {
            prompt(out, "Run it? [y/N] ")?;
            let answer = match next_input(lines, out).await? {
                Input::Line(answer) => answer,
                Input::Interrupted => {
                    writeln!(out, "{}", "Cancelled.".yellow())?;
                    return Ok(Flow::Continue);
                }
                Input::Closed => return Ok(Flow::Exit),
            };
            if !is_affirmative(&answer) {
                writeln!(out, "{}", "Skipped.".dim())?;
                if let Some(audit) = &self.audit
                    && let Err(e) = audit.log_declined(query, command, &self.working_dir)
                {
                    warn!(error = %e, "failed to write audit log");
                }
                return Ok(Flow::Continue);
            }
        }

        let result = tokio::select! {
            result = self.executor.execute(command) => result,
            _ = tokio::signal::ctrl_c() => {
                writeln!(out, "{}", "Cancelled.".yellow())?;
                return Ok(Flow::Continue);
            }
        };

        self.record(command, &result);
        report(&result, out)?;
        Ok(Flow::Continue)
    }

    fn record(&self, command: &str, result: &ExecutionResult) {
        if let Some(audit) = &self.audit
            && let Err(e) = audit.log_execution(command, &self.working_dir, result)
        {
            warn!(error = %e, "failed to write audit log");
        }
    }
}

fn prompt<W: Write>(out: &mut W, text: &str) -> AppResult<()> {
    write!(out, "{}", text.bold())?;
    out.flush()?;
    Ok(())
}

fn report<W: Write>(result: &ExecutionResult, out: &mut W) -> AppResult<()> {
    if let ExecutionResult::Success(stdout) = result {
        if stdout.is_empty() {
            writeln!(out, "{}", "Done.".green())?;
        } else {
            write!(out, "{}", stdout)?;
            if !stdout.ends_with('\n') {
                writeln!(out)?;
            }
        }
        return Ok(());
    }

    if let Some(hint) = FailureHints::explain(result) {
        writeln!(out, "{}", hint.simple_message.as_str().red())?;
        if let Some(suggestion) = &hint.suggestion {
            writeln!(out, "{} {}", "Hint:".yellow(), suggestion)?;
        }
        if !hint.raw_error.is_empty() {
            writeln!(out, "{}", hint.raw_error.as_str().dim())?;
        }
    }
    Ok(())
}
