//! Storage module for persistent data storage
//!
//! Provides SQLite-based persistence for documents and request logs.

mod database;

pub use database::SqliteStore;
