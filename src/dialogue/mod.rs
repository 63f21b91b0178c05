pub mod engine;
pub mod mock;
pub mod outcome;

pub use engine::{DialogueEngine, EngineError, EngineOptions, AUTH_REMEDIATION, TRANSPORT_APOLOGY};
pub use mock::{MockResponder, MockRule};
pub use outcome::GenerationOutcome;
