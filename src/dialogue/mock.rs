//! Canned offline responses.
//!
//! An ordered table of `(predicate, response)` rules; the first rule whose
//! predicate matches decides the outcome. Predicates see the input lowercased
//! (ASCII only, so byte offsets line up with the original text).

use crate::dialogue::outcome::GenerationOutcome;

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "howdy", "greetings"];
const SEARCH_LEADS: &[&str] = &["search for ", "search ", "find all ", "find "];
const DEFAULT_DIRECTORY_NAME: &str = "new_directory";

pub const GREETING_REPLY: &str =
    "Hello! Tell me what you want to do in the terminal and I'll suggest a command.";
pub const IDENTITY_REPLY: &str = "I'm shelltalk, an assistant that turns plain-language requests \
into terminal commands. I'm running offline right now, so I only understand a few simple requests.";
pub const HELP_REPLY: &str = "Offline mode understands: \"list files\", \"current directory\", \
\"make directory called <name>\", and \"search for <text>\". Type 'exit' to quit.";

pub const SEARCH_USAGE_REPLY: &str =
    "Tell me what to look for in the same message, for example \"search for TODO\".";

/// One row of the responder table
pub struct MockRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub respond: fn(&str) -> GenerationOutcome,
}

pub struct MockResponder {
    rules: Vec<MockRule>,
}

impl MockResponder {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<MockRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[MockRule] {
        &self.rules
    }

    /// Answer an utterance from the table; `Empty` when nothing matches
    pub fn respond(&self, input: &str) -> GenerationOutcome {
        let lowered = input.to_ascii_lowercase();
        self.rules
            .iter()
            .find(|rule| (rule.matches)(&lowered))
            .map(|rule| {
                tracing::debug!(rule = rule.name, "offline rule matched");
                (rule.respond)(input)
            })
            .unwrap_or(GenerationOutcome::Empty)
    }
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_rules() -> Vec<MockRule> {
    vec![
        MockRule {
            name: "greeting",
            matches: |s| words(s).any(|w| GREETING_WORDS.contains(&w)),
            respond: |_| GenerationOutcome::CasualReply(GREETING_REPLY.to_string()),
        },
        MockRule {
            name: "identity",
            matches: |s| s.contains("who are you") || s.contains("what are you"),
            respond: |_| GenerationOutcome::CasualReply(IDENTITY_REPLY.to_string()),
        },
        MockRule {
            name: "help",
            matches: |s| s.contains("help"),
            respond: |_| GenerationOutcome::CasualReply(HELP_REPLY.to_string()),
        },
        MockRule {
            name: "list-files",
            matches: |s| s.contains("list") && s.contains("file"),
            respond: |_| GenerationOutcome::Command("ls -la".to_string()),
        },
        MockRule {
            name: "current-directory",
            matches: |s| {
                s.contains("current directory")
                    || s.contains("working directory")
                    || s.contains("where am i")
            },
            respond: |_| GenerationOutcome::Command("pwd".to_string()),
        },
        MockRule {
            name: "make-directory",
            matches: |s| {
                (s.contains("make") || s.contains("create") || s.contains("new"))
                    && (s.contains("directory") || s.contains("folder"))
            },
            respond: make_directory,
        },
        MockRule {
            name: "search",
            matches: |s| s.contains("search") || s.contains("find"),
            respond: search,
        },
    ]
}

fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
}

fn make_directory(input: &str) -> GenerationOutcome {
    let name = input
        .split_whitespace()
        .skip_while(|w| !matches!(w.to_ascii_lowercase().as_str(), "called" | "named"))
        .nth(1)
        .map(|w| w.trim_matches(|c| c == '"' || c == '\'' || c == '.' || c == ','))
        .filter(|w| !w.is_empty())
        .unwrap_or(DEFAULT_DIRECTORY_NAME);

    GenerationOutcome::Command(format!("mkdir -p {}", shell_words::quote(name)))
}

fn search(input: &str) -> GenerationOutcome {
    let lowered = input.to_ascii_lowercase();
    let term = SEARCH_LEADS
        .iter()
        .find_map(|lead| lowered.find(lead).map(|pos| &input[pos + lead.len()..]))
        .map(|rest| rest.trim().trim_matches(|c| c == '"' || c == '\''))
        .unwrap_or("");

    if term.is_empty() {
        return GenerationOutcome::CasualReply(SEARCH_USAGE_REPLY.to_string());
    }

    GenerationOutcome::Command(format!("grep -r '{}' .", term.replace('\'', r"'\''")))
}
