//! Database and schema tests
//!
//! Tests SQLite migrations, schema constraints and the SQLite-backed conversation store

use chrono::Utc;
use conversation_gateway::infrastructure::database::DatabaseConnection;
use conversation_gateway::infrastructure::entities::MessageRole;
use conversation_gateway::infrastructure::repositories::DbConversationStore;
use conversation_gateway::infrastructure::traits::{ConversationStore, StoreError};
use di::Ref;
use sqlx::SqlitePool;
use std::time::Duration;
use uuid::Uuid;

/// Setup test database with migrations
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    DatabaseConnection::from_pool(pool.clone())
        .migrate()
        .await
        .unwrap();
    pool
}

fn store(pool: &SqlitePool) -> DbConversationStore {
    DbConversationStore::new(Ref::new(DatabaseConnection::from_pool(pool.clone())))
}

/// Keeps consecutive writes in distinct milliseconds.
async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test]
async fn test_database_migrations_work() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(&pool)
            .await
            .unwrap();
    let tables: Vec<String> = tables.into_iter().map(|(name,)| name).collect();

    assert!(tables.contains(&"conversations".to_owned()));
    assert!(tables.contains(&"messages".to_owned()));
}

#[tokio::test]
async fn test_message_role_constraint() {
    let pool = setup_test_db().await;
    let conversation = store(&pool)
        .create_conversation("owner", "title")
        .await
        .unwrap();

    let result = sqlx::query(
        "INSERT INTO messages (id, conversation_id, role, created_at, content) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4())
    .bind(conversation.id)
    .bind(3)
    .bind(Utc::now())
    .bind("system prompt")
    .execute(&pool)
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_conversation_cascade_delete() {
    let pool = setup_test_db().await;
    let store = store(&pool);

    let conversation = store.create_conversation("owner", "title").await.unwrap();
    store
        .append_message(conversation.id, MessageRole::User, "Test")
        .await
        .unwrap();

    sqlx::query("DELETE FROM conversations WHERE id = ?")
        .bind(conversation.id)
        .execute(&pool)
        .await
        .unwrap();

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE conversation_id = ?")
        .bind(conversation.id)
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn test_get_conversation_filters_by_owner() {
    let pool = setup_test_db().await;
    let store = store(&pool);

    let conversation = store.create_conversation("owner-a", "mine").await.unwrap();

    let found = store
        .get_conversation(conversation.id, "owner-a")
        .await
        .unwrap();
    assert_eq!(found, conversation);

    let foreign = store.get_conversation(conversation.id, "owner-b").await;
    assert!(matches!(foreign, Err(StoreError::NotFound)));

    let missing = store.get_conversation(Uuid::new_v4(), "owner-a").await;
    assert!(matches!(missing, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn test_list_messages_requires_ownership() {
    let pool = setup_test_db().await;
    let store = store(&pool);

    let conversation = store.create_conversation("owner-a", "mine").await.unwrap();
    store
        .append_message(conversation.id, MessageRole::User, "secret")
        .await
        .unwrap();

    let foreign = store.list_messages(conversation.id, "owner-b").await;
    assert!(matches!(foreign, Err(StoreError::NotFound)));

    let missing = store.list_messages(Uuid::new_v4(), "owner-a").await;
    assert!(matches!(missing, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn test_messages_are_listed_in_creation_order() {
    let pool = setup_test_db().await;
    let store = store(&pool);

    let conversation = store.create_conversation("owner", "chat").await.unwrap();
    let other = store.create_conversation("owner", "other").await.unwrap();

    let mut expected = Vec::new();
    for i in 0..6 {
        let role = if i % 2 == 0 {
            MessageRole::User
        } else {
            MessageRole::Assistant
        };
        let content = format!("message {i}");
        store
            .append_message(conversation.id, role, &content)
            .await
            .unwrap();
        expected.push((role, content));
    }
    store
        .append_message(other.id, MessageRole::User, "elsewhere")
        .await
        .unwrap();

    let messages = store.list_messages(conversation.id, "owner").await.unwrap();

    let listed: Vec<(MessageRole, String)> = messages
        .iter()
        .map(|m| (m.role, m.content.clone()))
        .collect();
    assert_eq!(listed, expected);
    assert!(
        messages
            .windows(2)
            .all(|pair| pair[0].created_at <= pair[1].created_at)
    );
}

#[tokio::test]
async fn test_append_advances_updated_at_and_list_order() {
    let pool = setup_test_db().await;
    let store = store(&pool);

    let older = store.create_conversation("owner", "older").await.unwrap();
    tick().await;
    let newer = store.create_conversation("owner", "newer").await.unwrap();
    store.create_conversation("someone else", "hidden").await.unwrap();

    let ids: Vec<Uuid> = store
        .list_conversations("owner")
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    tick().await;
    let message = store
        .append_message(older.id, MessageRole::User, "bump")
        .await
        .unwrap();

    let conversations = store.list_conversations("owner").await.unwrap();
    assert_eq!(conversations[0].id, older.id);
    assert_eq!(conversations[0].updated_at, message.created_at);
    assert_eq!(conversations[1].id, newer.id);

    let again = store.list_conversations("owner").await.unwrap();
    assert_eq!(again, conversations);
}

#[tokio::test]
async fn test_append_to_missing_conversation_fails() {
    let pool = setup_test_db().await;

    let result = store(&pool)
        .append_message(Uuid::new_v4(), MessageRole::User, "nobody home")
        .await;

    assert!(matches!(result, Err(StoreError::Database(_))));
}
