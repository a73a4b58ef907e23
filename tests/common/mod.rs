//! In-memory fakes for the store and the upstream clients.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use conversation_gateway::core::assistant::{ChatMessage, ProfileContext};
use conversation_gateway::core::error::GatewayError;
use conversation_gateway::core::identity::{Credential, Profile, Role, User, UserProfile};
use conversation_gateway::infrastructure::entities::{Conversation, Message, MessageRole};
use conversation_gateway::infrastructure::traits::{
    AiInferenceClient, AuthProfileClient, ConversationStore, StoreError,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

pub const OWNER: &str = "owner-1";
pub const OTHER_OWNER: &str = "owner-2";

#[derive(Default)]
struct MemoryState {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    /// Appends of this role fail with a database error.
    pub failing_role: Option<MessageRole>,
    /// Created conversations are reported but never stored.
    pub lose_created: bool,
}

impl MemoryStore {
    pub fn failing_appends_of(role: MessageRole) -> Self {
        MemoryStore {
            failing_role: Some(role),
            ..Default::default()
        }
    }

    pub fn losing_created() -> Self {
        MemoryStore {
            lose_created: true,
            ..Default::default()
        }
    }

    pub fn seed_conversation(&self, owner_id: &str) -> Uuid {
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_owned(),
            title: "seeded".to_owned(),
            created_at: now,
            updated_at: now,
        };
        let id = conversation.id;
        self.state.lock().unwrap().conversations.push(conversation);
        id
    }

    pub fn seed_message(&self, conversation_id: Uuid, role: MessageRole, content: &str) {
        self.state.lock().unwrap().messages.push(Message {
            id: Uuid::new_v4(),
            conversation_id,
            role,
            created_at: Utc::now(),
            content: content.to_owned(),
        });
    }

    pub fn messages(&self, conversation_id: Uuid) -> Vec<(MessageRole, String)> {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .map(|m| (m.role, m.content.clone()))
            .collect()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn create_conversation(
        &self,
        owner_id: &str,
        title: &str,
    ) -> Result<Conversation, StoreError> {
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_owned(),
            title: title.to_owned(),
            created_at: now,
            updated_at: now,
        };
        if !self.lose_created {
            self.state
                .lock()
                .unwrap()
                .conversations
                .push(conversation.clone());
        }
        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        conversation_id: Uuid,
        owner_id: &str,
    ) -> Result<Conversation, StoreError> {
        self.state
            .lock()
            .unwrap()
            .conversations
            .iter()
            .find(|c| c.id == conversation_id && c.owner_id == owner_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_conversations(&self, owner_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let mut conversations: Vec<Conversation> = self
            .state
            .lock()
            .unwrap()
            .conversations
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        owner_id: &str,
    ) -> Result<Vec<Message>, StoreError> {
        self.get_conversation(conversation_id, owner_id).await?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn append_message(
        &self,
        conversation_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, StoreError> {
        if self.failing_role == Some(role) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            role,
            created_at: Utc::now(),
            content: content.to_owned(),
        };
        let mut state = self.state.lock().unwrap();
        state.messages.push(message.clone());
        if let Some(conversation) = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            conversation.updated_at = message.created_at;
        }
        Ok(message)
    }
}

pub struct FakeAuth {
    pub role: Role,
    pub credits: u64,
    pub fetch_error: Option<fn() -> GatewayError>,
    pub debit_error: Option<fn() -> GatewayError>,
    pub profile_calls: AtomicUsize,
    pub debit_calls: AtomicUsize,
}

impl FakeAuth {
    pub fn new(role: Role, credits: u64) -> Self {
        FakeAuth {
            role,
            credits,
            fetch_error: None,
            debit_error: None,
            profile_calls: AtomicUsize::new(0),
            debit_calls: AtomicUsize::new(0),
        }
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn debit_calls(&self) -> usize {
        self.debit_calls.load(Ordering::SeqCst)
    }

    fn user(&self) -> User {
        User {
            id: OWNER.to_owned(),
            full_name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            username: "ada".to_owned(),
            role: self.role,
        }
    }
}

#[async_trait]
impl AuthProfileClient for FakeAuth {
    async fn fetch_user(&self, _credential: &Credential) -> Result<User, GatewayError> {
        Ok(self.user())
    }

    async fn fetch_profile(&self, _credential: &Credential) -> Result<UserProfile, GatewayError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fetch_error {
            return Err(error());
        }

        Ok(UserProfile {
            user: self.user(),
            profile: Profile {
                credits: self.credits,
                canvas_api_key: None,
                is_student: true,
            },
        })
    }

    async fn debit_one_credit(&self, _credential: &Credential) -> Result<(), GatewayError> {
        self.debit_calls.fetch_add(1, Ordering::SeqCst);
        match self.debit_error {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }
}

pub struct FakeInference {
    pub reply: Option<String>,
    pub title: Option<String>,
    pub completion_calls: AtomicUsize,
    pub seen_history: Mutex<Vec<ChatMessage>>,
    pub seen_username: Mutex<Option<String>>,
}

impl FakeInference {
    pub fn replying(reply: &str) -> Self {
        FakeInference {
            reply: Some(reply.to_owned()),
            title: Some("A generated title".to_owned()),
            completion_calls: AtomicUsize::new(0),
            seen_history: Mutex::new(Vec::new()),
            seen_username: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        FakeInference {
            reply: None,
            title: None,
            ..FakeInference::replying("")
        }
    }

    pub fn completion_calls(&self) -> usize {
        self.completion_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiInferenceClient for FakeInference {
    async fn generate_title(&self, _prompt: &str) -> Result<String, GatewayError> {
        self.title
            .clone()
            .ok_or_else(|| GatewayError::Upstream("title service down".to_owned()))
    }

    async fn generate_completion(
        &self,
        history: &[ChatMessage],
        profile: &ProfileContext,
    ) -> Result<String, GatewayError> {
        self.completion_calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_history.lock().unwrap() = history.to_vec();
        *self.seen_username.lock().unwrap() = Some(profile.username.clone());

        self.reply
            .clone()
            .ok_or_else(|| GatewayError::Upstream("inference service down".to_owned()))
    }
}
