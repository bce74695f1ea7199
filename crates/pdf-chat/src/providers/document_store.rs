//! Document store provider trait for extracted PDFs

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Document, NewDocument};

/// Trait for document persistence
///
/// Implementations:
/// - `SqliteStore`: SQLite database (file-backed or in-memory)
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a fully extracted document
    ///
    /// Returns the identifier assigned by the store
    async fn insert(&self, document: &NewDocument) -> Result<String>;

    /// Look up a document; `Ok(None)` when the id is unknown or malformed
    async fn find(&self, id: &str) -> Result<Option<Document>>;

    /// Check if the store is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
