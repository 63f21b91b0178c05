//! Line-prefix reply protocol spoken with the model.
//!
//! A casual-classification reply is one `RESPONSE:` line. A command reply is
//! a `COMMAND:` line followed by a `QUESTION:` line. Other lines are ignored,
//! a missing prefix leaves its slot `None`, and when a prefix repeats the last
//! occurrence wins.

pub const RESPONSE_PREFIX: &str = "RESPONSE:";
pub const COMMAND_PREFIX: &str = "COMMAND:";
pub const QUESTION_PREFIX: &str = "QUESTION:";

/// Placeholders models emit instead of leaving a slot blank
const EMPTY_MARKERS: &[&str] = &["empty", "<empty>", "(empty)", "none", "<none>", "n/a"];

/// Both slots of a command-generation reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandReply {
    pub command: Option<String>,
    pub question: Option<String>,
}

impl CommandReply {
    /// The command slot, if present and non-empty
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref().filter(|c| !c.is_empty())
    }

    /// The question slot, if present and non-empty
    pub fn question(&self) -> Option<&str> {
        self.question.as_deref().filter(|q| !q.is_empty())
    }
}

/// Parse a `RESPONSE:` reply; `Some("")` means the model declined
pub fn parse_casual_reply(text: &str) -> Option<String> {
    let mut response = None;
    for line in text.lines() {
        if let Some(rest) = line.trim().strip_prefix(RESPONSE_PREFIX) {
            response = Some(clean_slot(rest));
        }
    }
    response
}

/// Parse a `COMMAND:` / `QUESTION:` reply
pub fn parse_command_reply(text: &str) -> CommandReply {
    let mut reply = CommandReply::default();
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(COMMAND_PREFIX) {
            reply.command = Some(strip_backticks(&clean_slot(rest)).to_string());
        } else if let Some(rest) = line.strip_prefix(QUESTION_PREFIX) {
            reply.question = Some(clean_slot(rest));
        }
    }
    reply
}

fn clean_slot(raw: &str) -> String {
    let value = raw.trim();
    if EMPTY_MARKERS
        .iter()
        .any(|marker| value.eq_ignore_ascii_case(marker))
    {
        return String::new();
    }
    value.to_string()
}

fn strip_backticks(value: &str) -> &str {
    value
        .strip_prefix('`')
        .and_then(|v| v.strip_suffix('`'))
        .map(str::trim)
        .unwrap_or(value)
}
