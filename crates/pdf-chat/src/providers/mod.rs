//! Provider abstractions for the collaborators the service depends on
//!
//! The document store, the conversation list store, the request log sink, and the
//! chat model are all reached through traits so backends can be swapped (SQLite or
//! in-memory, Gemini or a scripted model in tests).

pub mod document_store;
pub mod gemini;
pub mod list_store;
pub mod llm;
pub mod local;
pub mod log_sink;

pub use document_store::DocumentStore;
pub use gemini::GeminiClient;
pub use list_store::ListStore;
pub use llm::{ChatModel, ChatSession, ReplyStream};
pub use local::MemoryListStore;
pub use log_sink::RequestLogSink;
