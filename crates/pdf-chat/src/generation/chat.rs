//! Chat orchestration: document + history + message -> one model call

use futures::StreamExt;
use std::sync::Arc;

use crate::cache::ConversationHistory;
use crate::error::{Error, Result};
use crate::providers::ChatModel;
use crate::types::{ConversationTurn, Document};

/// Result of one completed exchange
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Full reply, fragments concatenated in arrival order
    pub reply: String,
    /// History after the new user/model pair was appended
    pub history: Vec<ConversationTurn>,
}

/// Runs grounded conversations against a chat model
pub struct ChatOrchestrator {
    model: Arc<dyn ChatModel>,
    history: Arc<ConversationHistory>,
}

impl ChatOrchestrator {
    pub fn new(model: Arc<dyn ChatModel>, history: Arc<ConversationHistory>) -> Self {
        Self { model, history }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Answer a message about a document
    ///
    /// The retained history is replayed ahead of the message. The reply stream is
    /// drained completely before anything is written back, so a failed or interrupted
    /// reply leaves the history untouched.
    pub async fn converse(&self, document: &Document, message: &str) -> Result<ChatOutcome> {
        let prior = self.history.get(&document.id).await?;
        let prior_turns = prior.len();
        let session = self
            .model
            .start_conversation(&document.metadata, &document.text, prior);

        let mut fragments = self
            .model
            .send(&session, message)
            .await
            .map_err(into_model_error)?;

        let mut reply = String::new();
        while let Some(fragment) = fragments.next().await {
            reply.push_str(&fragment.map_err(into_model_error)?);
        }

        self.history
            .push(
                &document.id,
                &[ConversationTurn::user(message), ConversationTurn::model(reply.as_str())],
            )
            .await?;

        tracing::info!(
            "Chat on {} via {}: {} prior turns, {} reply chars",
            document.id,
            self.model.model(),
            prior_turns,
            reply.len()
        );

        let history = self.history.get(&document.id).await?;
        Ok(ChatOutcome { reply, history })
    }
}

fn into_model_error(err: Error) -> Error {
    match err {
        Error::ModelInvocation(_) => err,
        other => Error::model(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::llm::{ChatSession, ReplyStream};
    use crate::providers::MemoryListStore;
    use crate::types::{DocumentMetadata, Role};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Model that replays fixed fragments and records the sessions it was given
    struct ScriptedModel {
        fragments: Vec<std::result::Result<String, String>>,
        sessions: Mutex<Vec<(ChatSession, String)>>,
    }

    impl ScriptedModel {
        fn new(fragments: Vec<std::result::Result<&str, &str>>) -> Self {
            Self {
                fragments: fragments
                    .into_iter()
                    .map(|f| f.map(str::to_string).map_err(str::to_string))
                    .collect(),
                sessions: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn send(&self, session: &ChatSession, message: &str) -> Result<ReplyStream> {
            self.sessions.lock().push((session.clone(), message.to_string()));
            let items: Vec<Result<String>> = self
                .fragments
                .iter()
                .cloned()
                .map(|f| f.map_err(Error::model))
                .collect();
            Ok(futures::stream::iter(items).boxed())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-1"
        }
    }

    fn document() -> Document {
        Document {
            id: "doc-1".into(),
            metadata: DocumentMetadata {
                title: "Handbook".into(),
                filename: "handbook.pdf".into(),
                page_count: 3,
                ..Default::default()
            },
            text: "Employees receive twenty days of leave.".into(),
        }
    }

    fn orchestrator(model: Arc<ScriptedModel>, capacity: usize) -> ChatOrchestrator {
        let history = ConversationHistory::new(Arc::new(MemoryListStore::new()), capacity);
        ChatOrchestrator::new(model, Arc::new(history))
    }

    #[tokio::test]
    async fn test_fragments_concatenate_and_history_appends() {
        let model = Arc::new(ScriptedModel::new(vec![Ok("Twenty "), Ok("days.")]));
        let chat = orchestrator(model.clone(), 30);

        let outcome = chat.converse(&document(), "How much leave?").await.unwrap();
        assert_eq!(outcome.reply, "Twenty days.");
        assert_eq!(
            outcome.history,
            vec![
                ConversationTurn::user("How much leave?"),
                ConversationTurn::model("Twenty days."),
            ]
        );

        let sessions = model.sessions.lock();
        let (session, message) = &sessions[0];
        assert_eq!(message, "How much leave?");
        assert!(session.history.is_empty());
        assert!(session.system_instruction.contains("twenty days of leave"));
        assert!(session.system_instruction.contains("Title: Handbook"));
    }

    #[tokio::test]
    async fn test_history_is_replayed_on_next_message() {
        let model = Arc::new(ScriptedModel::new(vec![Ok("ok")]));
        let chat = orchestrator(model.clone(), 30);

        chat.converse(&document(), "first").await.unwrap();
        chat.converse(&document(), "second").await.unwrap();

        let sessions = model.sessions.lock();
        let replayed = &sessions[1].0.history;
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed[0], ConversationTurn::user("first"));
        assert_eq!(replayed[1].role, Role::Model);
    }

    #[tokio::test]
    async fn test_failed_stream_leaves_history_unchanged() {
        let model = Arc::new(ScriptedModel::new(vec![Ok("partial"), Err("connection reset")]));
        let chat = orchestrator(model, 30);

        let err = chat.converse(&document(), "question").await.unwrap_err();
        assert!(matches!(err, Error::ModelInvocation(_)));
        assert_eq!(chat.history().length("doc-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_history_stays_bounded() {
        let model = Arc::new(ScriptedModel::new(vec![Ok("reply")]));
        let chat = orchestrator(model, 4);

        for i in 0..5 {
            chat.converse(&document(), &format!("q{}", i)).await.unwrap();
        }
        let history = chat.history().get("doc-1").await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0], ConversationTurn::user("q3"));
    }

    #[test]
    fn test_non_model_errors_are_wrapped() {
        let err = into_model_error(Error::internal("boom"));
        assert!(matches!(err, Error::ModelInvocation(_)));
    }
}
