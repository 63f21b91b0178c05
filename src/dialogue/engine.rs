use crate::config::Config;
use crate::dialogue::mock::MockResponder;
use crate::dialogue::outcome::GenerationOutcome;
use crate::llm::client::{LLMError, LanguageModelClient, Turn};
use crate::llm::reply::{parse_casual_reply, parse_command_reply};
use thiserror::Error;
use tracing::{debug, error, warn};

pub const AUTH_REMEDIATION: &str = "Authentication with the language model failed. \
Update your API key (shelltalk config set-key <KEY>, or the configured environment variable) \
and restart shelltalk.";

pub const TRANSPORT_APOLOGY: &str =
    "Sorry, I couldn't get an answer from the language model just now. Please try again.";

const CASUAL_INSTRUCTION: &str = "You are the conversational front end of a terminal assistant \
that turns natural-language requests into shell commands.
Look only at the user's latest message.
If it is casual conversation (a greeting, thanks, small talk, or a question about you or what \
you can do), answer it briefly on one line formatted as:
RESPONSE: <your reply>
If it asks for anything to be done on the computer, reply with exactly:
RESPONSE:
and nothing else.";

const COMMAND_INSTRUCTION: &str = "You are a terminal command expert. Convert the user's request \
into a single terminal command line.
If you need more information to write the command, ask one follow-up question instead.
Output no explanations. The command must be safe and follow common practice.
If the request is unclear or potentially dangerous, leave both fields empty.
Format your response exactly as:
COMMAND: <command or empty>
QUESTION: <follow-up question or empty>";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No API key found. Set {0}, run `shelltalk config set-key <KEY>`, or start with --offline")]
    MissingCredential(String),

    #[error("Failed to create LLM client: {0}")]
    Client(#[from] LLMError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub offline: bool,
}

/// Turns user utterances into generation outcomes for one session
///
/// The engine owns the transcript and the authentication latch. Turns are
/// committed only once a call has computed its outcome, so dropping an
/// in-flight `respond` future leaves the session exactly as it was.
pub struct DialogueEngine {
    client: Option<Box<dyn LanguageModelClient>>,
    responder: MockResponder,
    transcript: Vec<Turn>,
    auth_failed: bool,
    offline: bool,
}

impl DialogueEngine {
    pub fn new(client: Box<dyn LanguageModelClient>, options: EngineOptions) -> Self {
        Self {
            client: Some(client),
            responder: MockResponder::new(),
            transcript: Vec::new(),
            auth_failed: false,
            offline: options.offline,
        }
    }

    /// An engine that never contacts a model
    pub fn offline() -> Self {
        Self {
            client: None,
            responder: MockResponder::new(),
            transcript: Vec::new(),
            auth_failed: false,
            offline: true,
        }
    }

    /// Build an engine from configuration
    ///
    /// Fails when no credential is available, unless offline mode is on.
    pub fn from_config(config: &Config, offline: bool) -> Result<Self, EngineError> {
        if offline || config.behavior.offline {
            debug!("starting dialogue engine in offline mode");
            return Ok(Self::offline());
        }

        let api_key = config
            .get_api_key()
            .ok_or_else(|| EngineError::MissingCredential(config.llm.api_key_env.clone()))?;
        let client = crate::llm::build_client(&config.llm, api_key)?;

        Ok(Self::new(client, EngineOptions { offline: false }))
    }

    pub fn with_responder(mut self, responder: MockResponder) -> Self {
        self.responder = responder;
        self
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn auth_failed(&self) -> bool {
        self.auth_failed
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Produce the outcome for one user utterance
    pub async fn respond(&mut self, input: &str) -> GenerationOutcome {
        if self.auth_failed {
            return GenerationOutcome::CasualReply(AUTH_REMEDIATION.to_string());
        }

        let client = match self.client.as_deref() {
            Some(client) if !self.offline => client,
            _ => return self.responder.respond(input),
        };

        let mut pending = self.transcript.clone();
        pending.push(Turn::user(input));

        debug!(turns = pending.len(), "casual classification request");
        let casual = match client.send(&pending, CASUAL_INSTRUCTION).await {
            Ok(raw) => parse_casual_reply(&raw).filter(|reply| !reply.is_empty()),
            Err(e) => return Self::recover(&mut self.auth_failed, e),
        };

        if let Some(reply) = casual {
            pending.push(Turn::assistant(reply.clone()));
            self.transcript = pending;
            return GenerationOutcome::CasualReply(reply);
        }

        debug!(turns = pending.len(), "command generation request");
        let raw = match client.send(&pending, COMMAND_INSTRUCTION).await {
            Ok(raw) => raw,
            Err(e) => return Self::recover(&mut self.auth_failed, e),
        };

        let reply = parse_command_reply(&raw);
        let outcome = if let Some(command) = reply.command() {
            GenerationOutcome::Command(command.to_string())
        } else if let Some(question) = reply.question() {
            GenerationOutcome::Question(question.to_string())
        } else {
            GenerationOutcome::Empty
        };

        pending.push(Turn::assistant(raw));
        self.transcript = pending;
        outcome
    }

    fn recover(auth_failed: &mut bool, err: LLMError) -> GenerationOutcome {
        if err.is_authentication_failure() {
            error!(error = %err, "model rejected credentials; disabling remote calls for this session");
            *auth_failed = true;
            GenerationOutcome::CasualReply(AUTH_REMEDIATION.to_string())
        } else {
            warn!(error = %err, "model request failed");
            GenerationOutcome::CasualReply(TRANSPORT_APOLOGY.to_string())
        }
    }
}
