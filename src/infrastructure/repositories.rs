//! DB Repository abstractions

use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{Conversation, Message, MessageRole};
use crate::infrastructure::traits::{ConversationStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use log::error;
use uuid::Uuid;

const CONVERSATION_COLUMNS: &str = "id, owner_id, title, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, conversation_id, role, created_at, content";

#[injectable(ConversationStore)]
pub struct DbConversationStore {
    connection: Ref<DatabaseConnection>,
}

impl DbConversationStore {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

impl DbConversationStore {
    async fn insert_message(
        &self,
        conversation_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, StoreError> {
        let now = Utc::now();
        let mut tx = self.connection.begin().await?;

        let message: Message = sqlx::query_as(&format!(
            "INSERT INTO messages (id, conversation_id, role, created_at, content) VALUES (?, ?, ?, ?, ?) RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(role)
        .bind(now)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(message)
    }
}

fn log_failure(e: &StoreError) {
    if let StoreError::Database(e) = e {
        error!("conversation store: {e}");
    }
}

#[async_trait]
impl ConversationStore for DbConversationStore {
    async fn create_conversation(
        &self,
        owner_id: &str,
        title: &str,
    ) -> Result<Conversation, StoreError> {
        let now = Utc::now();

        sqlx::query_as(&format!(
            "INSERT INTO conversations (id, owner_id, title, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING {CONVERSATION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(title)
        .bind(now)
        .bind(now)
        .fetch_one(&**self.connection)
        .await
        .map_err(StoreError::from)
        .inspect_err(log_failure)
    }

    async fn get_conversation(
        &self,
        conversation_id: Uuid,
        owner_id: &str,
    ) -> Result<Conversation, StoreError> {
        sqlx::query_as(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ? AND owner_id = ?"
        ))
        .bind(conversation_id)
        .bind(owner_id)
        .fetch_optional(&**self.connection)
        .await
        .map_err(StoreError::from)
        .inspect_err(log_failure)?
        .ok_or(StoreError::NotFound)
    }

    async fn list_conversations(&self, owner_id: &str) -> Result<Vec<Conversation>, StoreError> {
        sqlx::query_as(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE owner_id = ? ORDER BY julianday(updated_at) DESC, rowid DESC"
        ))
        .bind(owner_id)
        .fetch_all(&**self.connection)
        .await
        .map_err(StoreError::from)
        .inspect_err(log_failure)
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        owner_id: &str,
    ) -> Result<Vec<Message>, StoreError> {
        let conversation = self.get_conversation(conversation_id, owner_id).await?;

        // rowid breaks ties between messages created within the same instant
        sqlx::query_as(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE conversation_id = ? ORDER BY julianday(created_at) ASC, rowid ASC"
        ))
        .bind(conversation.id)
        .fetch_all(&**self.connection)
        .await
        .map_err(StoreError::from)
        .inspect_err(log_failure)
    }

    async fn append_message(
        &self,
        conversation_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, StoreError> {
        self.insert_message(conversation_id, role, content)
            .await
            .inspect_err(log_failure)
    }
}
