use std::fmt;

/// What one dialogue turn produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// A command line to hand to the safety filter
    Command(String),
    /// A clarifying question; the caller answers it with another turn
    Question(String),
    /// Conversation that needs no command
    CasualReply(String),
    /// Nothing usable: unclear, unsafe, or unmatched request
    Empty,
}

impl GenerationOutcome {
    pub fn command(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Command(cmd) => Some(cmd),
            _ => None,
        }
    }

    pub fn is_question(&self) -> bool {
        matches!(self, GenerationOutcome::Question(_))
    }
}

impl fmt::Display for GenerationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationOutcome::Command(cmd) => write!(f, "command: {}", cmd),
            GenerationOutcome::Question(q) => write!(f, "question: {}", q),
            GenerationOutcome::CasualReply(text) => write!(f, "reply: {}", text),
            GenerationOutcome::Empty => write!(f, "empty"),
        }
    }
}
