//! DI "Interfaces"

use crate::core::error::GatewayError;
use crate::core::orchestrator::{ChatTurn, TurnOutcome};
use crate::infrastructure::entities;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Lists all conversations for the given owner, most recently updated first.
    async fn list_conversations(
        &self,
        owner_id: &str,
    ) -> Result<Vec<entities::Conversation>, GatewayError>;

    /// Creates a new conversation for the given owner, titled after the prompt.
    ///
    /// The created row is read back before returning; if that read fails the call reports
    /// `GatewayError::Internal` even though the row may exist.
    async fn create_conversation(
        &self,
        owner_id: &str,
        prompt: &str,
    ) -> Result<entities::Conversation, GatewayError>;

    /// Returns `NotFound` if the conversation does not exist or belongs to someone else.
    async fn get_conversation(
        &self,
        owner_id: &str,
        conversation_id: Uuid,
    ) -> Result<entities::Conversation, GatewayError>;

    /// List all messages in a conversation, oldest first.
    async fn list_messages(
        &self,
        owner_id: &str,
        conversation_id: Uuid,
    ) -> Result<Vec<entities::Message>, GatewayError>;

    /// Create a new user message in a conversation without asking for a reply.
    async fn create_user_message(
        &self,
        owner_id: &str,
        conversation_id: Uuid,
        prompt: &str,
    ) -> Result<entities::Message, GatewayError>;
}

/// Runs a single chat turn end to end.
#[async_trait]
pub trait ResponseOrchestrator: Send + Sync {
    async fn respond(&self, turn: ChatTurn) -> Result<TurnOutcome, GatewayError>;
}
