//! Fixed-capacity conversation history
//!
//! Each document id owns one ordered list in the backing [`ListStore`]. A push appends
//! its turns in a single store call, then drops oldest turns one at a time until the
//! list is back within capacity: one eviction per appended turn that overflowed. The
//! append/evict sequence for a key runs under that key's lock, so concurrent pushes
//! and reads on one document never interleave.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::providers::ListStore;
use crate::types::ConversationTurn;

/// Default number of turns retained per document
pub const DEFAULT_CAPACITY: usize = 30;

/// Bounded, oldest-evicted turn history per document
pub struct ConversationHistory {
    store: Arc<dyn ListStore>,
    capacity: usize,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ConversationHistory {
    pub fn new(store: Arc<dyn ListStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
            locks: DashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Append turns in order, then evict one oldest turn per turn over capacity
    ///
    /// The turns land together or not at all, so a user/model pair is never split.
    pub async fn push(&self, key: &str, turns: &[ConversationTurn]) -> Result<()> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        self.store.push_back_all(key, turns).await?;
        let mut len = self.store.len(key).await?;
        while len > self.capacity {
            self.store.pop_front(key).await?;
            len -= 1;
        }

        tracing::debug!("Pushed {} turn(s) to history {}", turns.len(), key);
        Ok(())
    }

    /// All retained turns, oldest first; empty for an unknown key
    pub async fn get(&self, key: &str) -> Result<Vec<ConversationTurn>> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;
        self.store.range(key).await
    }

    pub async fn length(&self, key: &str) -> Result<usize> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;
        self.store.len(key).await
    }

    /// Drop the oldest turn; no-op when the history is empty
    pub async fn pop_oldest(&self, key: &str) -> Result<()> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;
        self.store.pop_front(key).await
    }
}
