//! Chat model provider trait

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::generation::prompt::grounding_context;
use crate::types::{ConversationTurn, DocumentMetadata};

/// Reply fragments in arrival order; finite and not restartable
pub type ReplyStream = BoxStream<'static, Result<String>>;

/// A conversation grounded in one document, ready to take the next message
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Instruction preamble plus document text and metadata
    pub system_instruction: String,
    /// Prior turns replayed ahead of the new message
    pub history: Vec<ConversationTurn>,
}

/// Trait for conversational model backends
///
/// Implementations:
/// - `GeminiClient`: Gemini `streamGenerateContent` over SSE
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Build a session from the document and its retained history
    fn start_conversation(
        &self,
        metadata: &DocumentMetadata,
        text: &str,
        history: Vec<ConversationTurn>,
    ) -> ChatSession {
        ChatSession {
            system_instruction: grounding_context(metadata, text),
            history,
        }
    }

    /// Send a message; the reply arrives as a stream of text fragments
    async fn send(&self, session: &ChatSession, message: &str) -> Result<ReplyStream>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
