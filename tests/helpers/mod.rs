#![allow(dead_code)]

use async_trait::async_trait;
use shelltalk::exec::{ProcessOutcome, ProcessRunner};
use shelltalk::llm::{LLMError, LanguageModelClient, Turn};
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Language model client that replays a fixed script of replies
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, LLMError>>>,
    seen: Arc<Mutex<Vec<Vec<Turn>>>>,
    calls: Arc<AtomicUsize>,
    stall_when_exhausted: bool,
}

/// Handles for inspecting a `ScriptedClient` after it is boxed
pub struct ScriptHandle {
    pub calls: Arc<AtomicUsize>,
    pub seen: Arc<Mutex<Vec<Vec<Turn>>>>,
}

impl ScriptHandle {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Transcript passed on the `n`th call
    pub fn transcript(&self, n: usize) -> Vec<Turn> {
        self.seen.lock().unwrap()[n].clone()
    }
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, LLMError>>) -> (Box<dyn LanguageModelClient>, ScriptHandle) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let client = Self {
            replies: Mutex::new(replies.into()),
            seen: Arc::clone(&seen),
            calls: Arc::clone(&calls),
            stall_when_exhausted: false,
        };
        (Box::new(client), ScriptHandle { calls, seen })
    }

    pub fn ok(replies: &[&str]) -> (Box<dyn LanguageModelClient>, ScriptHandle) {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    /// Like `ok`, but a call past the end of the script never completes
    pub fn stalling_after(replies: &[&str]) -> (Box<dyn LanguageModelClient>, ScriptHandle) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let client = Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            seen: Arc::clone(&seen),
            calls: Arc::clone(&calls),
            stall_when_exhausted: true,
        };
        (Box::new(client), ScriptHandle { calls, seen })
    }
}

#[async_trait]
impl LanguageModelClient for ScriptedClient {
    async fn send(&self, transcript: &[Turn], _system_instruction: &str) -> Result<String, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(transcript.to_vec());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(reply) => reply,
            None if self.stall_when_exhausted => std::future::pending().await,
            None => Err(LLMError::InvalidResponse("script exhausted".to_string())),
        }
    }
}

/// Process runner that records commands and always succeeds
pub struct CountingRunner {
    pub commands: Arc<Mutex<Vec<String>>>,
}

impl CountingRunner {
    pub fn new() -> (Box<dyn ProcessRunner>, Arc<Mutex<Vec<String>>>) {
        let commands = Arc::new(Mutex::new(Vec::new()));
        let runner = Self {
            commands: Arc::clone(&commands),
        };
        (Box::new(runner), commands)
    }
}

#[async_trait]
impl ProcessRunner for CountingRunner {
    async fn run(&self, command: &str, _timeout: Duration) -> io::Result<ProcessOutcome> {
        self.commands.lock().unwrap().push(command.to_string());
        Ok(ProcessOutcome::Exited {
            code: 0,
            stdout: format!("ran: {}\n", command),
            stderr: String::new(),
        })
    }
}

/// Scratch directory holding a `notes.txt` with a TODO line
pub fn create_workspace() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().to_path_buf();

    fs::write(path.join("notes.txt"), "first line\nTODO: write tests\nlast line\n")
        .expect("Failed to write notes.txt");
    fs::create_dir(path.join("src")).expect("Failed to create src dir");
    fs::write(path.join("src").join("main.txt"), "nothing to see\n")
        .expect("Failed to write src/main.txt");

    (temp_dir, path)
}
