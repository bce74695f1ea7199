//! Core types for the PDF chat service

pub mod conversation;
pub mod document;
pub mod log;
pub mod response;

pub use conversation::{ConversationTurn, Role};
pub use document::{Document, DocumentMetadata, NewDocument};
pub use log::{LogEntry, LogLevel};
pub use response::{ChatRequest, ChatResponse, ErrorBody, UploadResponse};
