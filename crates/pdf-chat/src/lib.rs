//! pdf-chat: upload a PDF, then chat with a model grounded in its text
//!
//! Uploads are streamed through a size guard and multipart parser, extracted with
//! lopdf, normalized, and stored in SQLite. Chat requests replay a bounded,
//! per-document conversation history to Gemini. Every request is logged on arrival
//! and on completion, with failures classified into a fixed error taxonomy.

pub mod cache;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use server::{build_router, state::AppState, PdfChatServer};
pub use types::{
    conversation::{ConversationTurn, Role},
    document::{Document, DocumentMetadata},
};
