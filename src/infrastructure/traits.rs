//! Infrastructure traits, used for DI on higher levels

use crate::core::assistant::{ChatMessage, ProfileContext};
use crate::core::error::GatewayError;
use crate::core::identity::{Credential, User, UserProfile};
use crate::infrastructure::entities;
use crate::infrastructure::entities::MessageRole;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence for conversations and their append-only message history.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(
        &self,
        owner_id: &str,
        title: &str,
    ) -> Result<entities::Conversation, StoreError>;

    /// Returns `StoreError::NotFound` unless the conversation exists *and* belongs to `owner_id`.
    async fn get_conversation(
        &self,
        conversation_id: Uuid,
        owner_id: &str,
    ) -> Result<entities::Conversation, StoreError>;

    /// Lists the owner's conversations, most recently updated first.
    async fn list_conversations(
        &self,
        owner_id: &str,
    ) -> Result<Vec<entities::Conversation>, StoreError>;

    /// Lists a conversation's messages in creation order.
    ///
    /// Returns `StoreError::NotFound` if the conversation does not exist or is not owned by
    /// `owner_id`.
    async fn list_messages(
        &self,
        conversation_id: Uuid,
        owner_id: &str,
    ) -> Result<Vec<entities::Message>, StoreError>;

    /// Appends a message and advances the conversation's `updated_at`.
    ///
    /// Ownership is not checked here; callers resolve the conversation first.
    async fn append_message(
        &self,
        conversation_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<entities::Message, StoreError>;
}

/// Client for the external auth/profile service, which owns identity and the credit ledger.
#[async_trait]
pub trait AuthProfileClient: Send + Sync {
    /// Resolves the caller behind a credential.
    async fn fetch_user(&self, credential: &Credential) -> Result<User, GatewayError>;

    /// Fetches a fresh profile snapshot, including the current credit balance.
    async fn fetch_profile(&self, credential: &Credential) -> Result<UserProfile, GatewayError>;

    /// Asks the auth service to debit exactly one credit.
    ///
    /// The debit is atomic on the remote side. Success says nothing about the resulting balance.
    async fn debit_one_credit(&self, credential: &Credential) -> Result<(), GatewayError>;
}

/// Client for the external generative-AI service.
#[async_trait]
pub trait AiInferenceClient: Send + Sync {
    async fn generate_title(&self, prompt: &str) -> Result<String, GatewayError>;

    /// Produces the assistant reply for an ordered conversation history.
    async fn generate_completion(
        &self,
        history: &[ChatMessage],
        profile: &ProfileContext,
    ) -> Result<String, GatewayError>;
}
