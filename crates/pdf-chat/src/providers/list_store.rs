//! List store provider trait backing conversation history

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ConversationTurn;

/// Trait for keyed, ordered lists of conversation turns
///
/// Each operation is individually atomic. Multi-step sequences (append then trim)
/// are serialized per key by `ConversationHistory`, not by the store.
///
/// Implementations:
/// - `MemoryListStore`: in-process lists
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Append a turn to the end of the list, creating the list if needed
    async fn push_back(&self, key: &str, turn: ConversationTurn) -> Result<()>;

    /// Append several turns in order as one operation; either all land or none do
    async fn push_back_all(&self, key: &str, turns: &[ConversationTurn]) -> Result<()>;

    /// Remove the first turn; no-op on an empty or absent list
    async fn pop_front(&self, key: &str) -> Result<()>;

    /// All turns in insertion order; empty for an absent key
    async fn range(&self, key: &str) -> Result<Vec<ConversationTurn>>;

    /// Number of turns stored under the key
    async fn len(&self, key: &str) -> Result<usize>;

    /// Check if the store is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
