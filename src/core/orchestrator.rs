//! Chat-turn orchestration.
//!
//! A turn runs strictly in sequence: resolve the conversation, record the user message, fetch
//! the caller's profile, apply the credit gate, build context, call the inference service,
//! record the reply and, for billable callers, debit one credit.
//!
//! Nothing is ever rolled back. Once the user message is stored it stays, even when a later step
//! fails and the turn ends without a reply. A failed debit is reported as an error although the
//! reply has already been stored.

use crate::core::assistant::{ChatMessage, ProfileContext};
use crate::core::credit_gate::{self, CreditDecision};
use crate::core::error::GatewayError;
use crate::core::identity::Credential;
use crate::core::traits::ResponseOrchestrator;
use crate::infrastructure::entities::{Message, MessageRole};
use crate::infrastructure::traits::{
    AiInferenceClient, AuthProfileClient, ConversationStore, StoreError,
};
use async_trait::async_trait;
use di::{Ref, injectable};
use log::{error, info, warn};
use uuid::Uuid;

/// Reply stored in place of a completion when a user has no credits left.
pub const CREDIT_DENIAL_NOTICE: &str =
    "You have run out of credits. Please purchase more credits to continue chatting.";

/// One `get-response` request, after the caller has been authenticated.
#[derive(Debug)]
pub struct ChatTurn {
    pub conversation_id: Uuid,
    pub owner_id: String,
    pub credential: Credential,
    pub prompt: String,
}

/// Successful terminal states. Both carry the stored assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Denied(Message),
    Completed(Message),
}

impl TurnOutcome {
    pub fn into_message(self) -> Message {
        match self {
            TurnOutcome::Denied(message) | TurnOutcome::Completed(message) => message,
        }
    }
}

#[injectable(ResponseOrchestrator)]
pub struct GatewayResponseOrchestrator {
    store: Ref<dyn ConversationStore>,
    auth: Ref<dyn AuthProfileClient>,
    inference: Ref<dyn AiInferenceClient>,
}

impl GatewayResponseOrchestrator {
    pub fn new(
        store: Ref<dyn ConversationStore>,
        auth: Ref<dyn AuthProfileClient>,
        inference: Ref<dyn AiInferenceClient>,
    ) -> Self {
        Self {
            store,
            auth,
            inference,
        }
    }

    async fn run(
        &self,
        conversation_id: Uuid,
        owner_id: &str,
        credential: &Credential,
        prompt: &str,
    ) -> Result<TurnOutcome, GatewayError> {
        let conversation = self.store.get_conversation(conversation_id, owner_id).await?;

        let user_message = self
            .store
            .append_message(conversation.id, MessageRole::User, prompt)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => GatewayError::from(StoreError::NotFound),
                StoreError::Database(e) => {
                    error!("failed to record user message in {conversation_id}: {e}");
                    GatewayError::Internal("Failed to record message".to_owned())
                }
            })?;

        // From here on every failure leaves `user_message` without a reply.
        let orphaned = |e: &GatewayError| {
            warn!(
                "user message {} in conversation {} left without a reply ({})",
                user_message.id,
                conversation.id,
                e.kind()
            );
        };

        let snapshot = self
            .auth
            .fetch_profile(credential)
            .await
            .inspect_err(orphaned)?;
        let role = snapshot.user.role;

        if credit_gate::decide(role, snapshot.profile.credits) == CreditDecision::Deny {
            let notice = self
                .store
                .append_message(conversation.id, MessageRole::Assistant, CREDIT_DENIAL_NOTICE)
                .await
                .map_err(GatewayError::from)
                .inspect_err(orphaned)?;

            return Ok(TurnOutcome::Denied(notice));
        }

        let history: Vec<ChatMessage> = self
            .store
            .list_messages(conversation.id, owner_id)
            .await
            .map_err(GatewayError::from)
            .inspect_err(orphaned)?
            .into_iter()
            .map(ChatMessage::from)
            .collect();
        let context = ProfileContext::from(snapshot);

        let completion = self
            .inference
            .generate_completion(&history, &context)
            .await
            .inspect_err(orphaned)?;

        let reply = self
            .store
            .append_message(conversation.id, MessageRole::Assistant, &completion)
            .await
            .map_err(|e| {
                error!(
                    "completion for conversation {} could not be stored and is lost: {e}",
                    conversation.id
                );
                GatewayError::from(e)
            })?;

        if role.is_billable() {
            // The reply is already stored; a failed debit still fails the turn.
            if let Err(e) = self.auth.debit_one_credit(credential).await {
                warn!(
                    "credit debit failed after reply {} was stored in conversation {}: {e}",
                    reply.id, conversation.id
                );
                return Err(e);
            }
        }

        Ok(TurnOutcome::Completed(reply))
    }
}

#[async_trait]
impl ResponseOrchestrator for GatewayResponseOrchestrator {
    async fn respond(&self, turn: ChatTurn) -> Result<TurnOutcome, GatewayError> {
        let ChatTurn {
            conversation_id,
            owner_id,
            credential,
            prompt,
        } = turn;

        let outcome = self
            .run(conversation_id, &owner_id, &credential, &prompt)
            .await;

        match &outcome {
            Ok(TurnOutcome::Denied(_)) => {
                info!("turn on conversation {conversation_id} denied: no credits left")
            }
            Ok(TurnOutcome::Completed(reply)) => {
                info!("turn on conversation {conversation_id} completed with reply {}", reply.id)
            }
            Err(e) => warn!("turn on conversation {conversation_id} failed ({}): {e}", e.kind()),
        }

        outcome
    }
}
