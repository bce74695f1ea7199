//! Bounded conversation history keyed by document id

pub mod history;

pub use history::ConversationHistory;
