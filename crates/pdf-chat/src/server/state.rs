//! Application state for the PDF chat server

use std::sync::Arc;

use super::logger::RequestLogger;
use crate::cache::ConversationHistory;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::generation::ChatOrchestrator;
use crate::providers::{ChatModel, DocumentStore, GeminiClient, ListStore, MemoryListStore, RequestLogSink};
use crate::storage::SqliteStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// Extracted documents
    documents: Arc<dyn DocumentStore>,
    /// Grounded chat over documents and their history
    chat: ChatOrchestrator,
    /// Request log writer
    logger: RequestLogger,
}

impl AppState {
    /// Create new application state
    ///
    /// Opens the SQLite store, builds the Gemini client, and checks both stores before
    /// the server accepts traffic.
    pub async fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!("Initializing PDF chat application state...");

        let sqlite = Arc::new(SqliteStore::new(&config.storage.database_path)?);
        let lists: Arc<dyn ListStore> = Arc::new(MemoryListStore::new());
        let model: Arc<dyn ChatModel> = Arc::new(GeminiClient::new(&config.model)?);
        tracing::info!(
            "Chat model initialized ({} / {})",
            model.name(),
            model.model()
        );

        Self::check_store("document store", sqlite.health_check().await)?;
        Self::check_store("list store", lists.health_check().await)?;

        let documents: Arc<dyn DocumentStore> = sqlite.clone();
        let log_sink: Arc<dyn RequestLogSink> = sqlite;
        Ok(Self::from_parts(config, documents, lists, model, log_sink))
    }

    /// Assemble state from already constructed collaborators
    pub fn from_parts(
        config: AppConfig,
        documents: Arc<dyn DocumentStore>,
        lists: Arc<dyn ListStore>,
        model: Arc<dyn ChatModel>,
        log_sink: Arc<dyn RequestLogSink>,
    ) -> Self {
        let history = Arc::new(ConversationHistory::new(lists, config.history.capacity));
        let chat = ChatOrchestrator::new(model, history);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                documents,
                chat,
                logger: RequestLogger::new(log_sink),
            }),
        }
    }

    fn check_store(label: &str, result: Result<bool>) -> Result<()> {
        match result {
            Ok(true) => {
                tracing::info!("{} is healthy", label);
                Ok(())
            }
            Ok(false) => Err(Error::storage(format!("{} failed its health check", label))),
            Err(e) => Err(Error::storage(format!("{} is unreachable: {}", label, e))),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn documents(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.documents
    }

    pub fn chat(&self) -> &ChatOrchestrator {
        &self.inner.chat
    }

    pub fn request_logger(&self) -> &RequestLogger {
        &self.inner.logger
    }
}
