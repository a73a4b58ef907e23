//! Implementations for the service the app needs.
//!

use crate::core::error::GatewayError;
use crate::core::traits::ConversationService;
use crate::infrastructure::entities::{Conversation, Message, MessageRole};
use crate::infrastructure::traits::{AiInferenceClient, ConversationStore};
use async_trait::async_trait;
use di::{Ref, injectable};
use log::{error, warn};
use uuid::Uuid;

/// Length of the prompt-derived title used when the inference service cannot name a
/// conversation.
const FALLBACK_TITLE_CHARS: usize = 10;

#[injectable(ConversationService)]
pub struct GatewayConversationService {
    store: Ref<dyn ConversationStore>,
    inference: Ref<dyn AiInferenceClient>,
}

impl GatewayConversationService {
    pub fn new(store: Ref<dyn ConversationStore>, inference: Ref<dyn AiInferenceClient>) -> Self {
        Self { store, inference }
    }

    async fn title_for(&self, prompt: &str) -> String {
        match self.inference.generate_title(prompt).await {
            Ok(title) => {
                let title = clean_title(&title);
                if title.is_empty() {
                    warn!("inference service returned an empty title, deriving one from the prompt");
                    fallback_title(prompt)
                } else {
                    title
                }
            }
            Err(e) => {
                warn!("title generation failed, deriving one from the prompt: {e}");
                fallback_title(prompt)
            }
        }
    }
}

/// Strips whitespace and surrounding quotes from a generated title.
fn clean_title(raw: &str) -> String {
    raw.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_owned()
}

fn fallback_title(prompt: &str) -> String {
    prompt.trim().chars().take(FALLBACK_TITLE_CHARS).collect()
}

#[async_trait]
impl ConversationService for GatewayConversationService {
    async fn list_conversations(&self, owner_id: &str) -> Result<Vec<Conversation>, GatewayError> {
        Ok(self.store.list_conversations(owner_id).await?)
    }

    async fn create_conversation(
        &self,
        owner_id: &str,
        prompt: &str,
    ) -> Result<Conversation, GatewayError> {
        let title = self.title_for(prompt).await;
        let created = self.store.create_conversation(owner_id, &title).await?;

        self.store
            .get_conversation(created.id, owner_id)
            .await
            .map_err(|e| {
                error!("conversation {} not readable right after creation: {e}", created.id);
                GatewayError::Internal("Error creating conversation".to_owned())
            })
    }

    async fn get_conversation(
        &self,
        owner_id: &str,
        conversation_id: Uuid,
    ) -> Result<Conversation, GatewayError> {
        Ok(self.store.get_conversation(conversation_id, owner_id).await?)
    }

    async fn list_messages(
        &self,
        owner_id: &str,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, GatewayError> {
        Ok(self.store.list_messages(conversation_id, owner_id).await?)
    }

    async fn create_user_message(
        &self,
        owner_id: &str,
        conversation_id: Uuid,
        prompt: &str,
    ) -> Result<Message, GatewayError> {
        let conversation = self.store.get_conversation(conversation_id, owner_id).await?;

        Ok(self
            .store
            .append_message(conversation.id, MessageRole::User, prompt)
            .await?)
    }
}
