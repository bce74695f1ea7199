//! Grounded chat generation over a single document

pub mod chat;
pub mod prompt;

pub use chat::{ChatOrchestrator, ChatOutcome};
pub use prompt::grounding_context;
