//! Local in-process provider implementations

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;

use crate::error::Result;
use crate::types::ConversationTurn;

use super::list_store::ListStore;

/// In-memory list store; lists live for the lifetime of the process
#[derive(Default)]
pub struct MemoryListStore {
    lists: DashMap<String, VecDeque<ConversationTurn>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys holding a list
    pub fn key_count(&self) -> usize {
        self.lists.len()
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn push_back(&self, key: &str, turn: ConversationTurn) -> Result<()> {
        self.lists.entry(key.to_string()).or_default().push_back(turn);
        Ok(())
    }

    async fn push_back_all(&self, key: &str, turns: &[ConversationTurn]) -> Result<()> {
        self.lists
            .entry(key.to_string())
            .or_default()
            .extend(turns.iter().cloned());
        Ok(())
    }

    async fn pop_front(&self, key: &str) -> Result<()> {
        if let Some(mut list) = self.lists.get_mut(key) {
            list.pop_front();
        }
        Ok(())
    }

    async fn range(&self, key: &str) -> Result<Vec<ConversationTurn>> {
        Ok(self
            .lists
            .get(key)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn len(&self, key: &str) -> Result<usize> {
        Ok(self.lists.get(key).map(|list| list.len()).unwrap_or(0))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
