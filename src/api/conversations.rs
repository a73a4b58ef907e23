//! Conversations endpoints

use crate::api::response::ApiResponse;
use crate::api::{ExtractCaller, ExtractConversationId, ExtractPrompt};
use crate::core::error::GatewayError;
use crate::core::orchestrator::{ChatTurn, TurnOutcome};
use crate::core::traits::{ConversationService, ResponseOrchestrator};
use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_conversations).post(new_conversation))
        .route("/:id", get(conversation_messages).post(post_message))
        .route("/:id/get-response", post(get_response))
}

async fn list_conversations(
    Inject(conversation_service): Inject<dyn ConversationService>,
    caller: ExtractCaller,
) -> Result<ApiResponse<Vec<schemas::Conversation>>, GatewayError> {
    let conversations = conversation_service
        .list_conversations(&caller.user.id)
        .await?;

    Ok(ApiResponse::new(
        StatusCode::OK,
        conversations
            .into_iter()
            .map(schemas::Conversation::from)
            .collect(),
        "Fetched All Conversations",
    ))
}

async fn new_conversation(
    Inject(conversation_service): Inject<dyn ConversationService>,
    caller: ExtractCaller,
    ExtractPrompt(prompt): ExtractPrompt,
) -> Result<ApiResponse<schemas::Conversation>, GatewayError> {
    let conversation = conversation_service
        .create_conversation(&caller.user.id, &prompt)
        .await?;

    Ok(ApiResponse::new(
        StatusCode::CREATED,
        conversation.into(),
        "Conversation Created Successfully",
    ))
}

async fn conversation_messages(
    Inject(conversation_service): Inject<dyn ConversationService>,
    caller: ExtractCaller,
    ExtractConversationId(conversation_id): ExtractConversationId,
) -> Result<ApiResponse<schemas::ConversationDetail>, GatewayError> {
    let conversation = conversation_service
        .get_conversation(&caller.user.id, conversation_id)
        .await?;
    let messages = conversation_service
        .list_messages(&caller.user.id, conversation_id)
        .await?;

    Ok(ApiResponse::new(
        StatusCode::OK,
        schemas::ConversationDetail {
            conversation: conversation.into(),
            messages: messages.into_iter().map(schemas::Message::from).collect(),
        },
        "Messages",
    ))
}

async fn post_message(
    Inject(conversation_service): Inject<dyn ConversationService>,
    caller: ExtractCaller,
    ExtractConversationId(conversation_id): ExtractConversationId,
    ExtractPrompt(prompt): ExtractPrompt,
) -> Result<ApiResponse<schemas::Message>, GatewayError> {
    let message = conversation_service
        .create_user_message(&caller.user.id, conversation_id, &prompt)
        .await?;

    Ok(ApiResponse::new(
        StatusCode::CREATED,
        message.into(),
        "Message Created",
    ))
}

async fn get_response(
    Inject(orchestrator): Inject<dyn ResponseOrchestrator>,
    caller: ExtractCaller,
    ExtractConversationId(conversation_id): ExtractConversationId,
    ExtractPrompt(prompt): ExtractPrompt,
) -> Result<ApiResponse<schemas::Message>, GatewayError> {
    let ExtractCaller { user, credential } = caller;

    let outcome = orchestrator
        .respond(ChatTurn {
            conversation_id,
            owner_id: user.id,
            credential,
            prompt,
        })
        .await?;

    let message = match outcome {
        TurnOutcome::Denied(_) => "Insufficient Credits",
        TurnOutcome::Completed(_) => "Response Generated",
    };

    Ok(ApiResponse::new(
        StatusCode::OK,
        outcome.into_message().into(),
        message,
    ))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::MessageRole;
    use chrono::{DateTime, Utc};
    use serde::Serialize;
    use uuid::Uuid;

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Conversation {
        pub id: Uuid,
        pub owner_id: String,
        pub title: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl From<entities::Conversation> for Conversation {
        fn from(conversation: entities::Conversation) -> Self {
            Conversation {
                id: conversation.id,
                owner_id: conversation.owner_id,
                title: conversation.title,
                created_at: conversation.created_at,
                updated_at: conversation.updated_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ConversationDetail {
        #[serde(flatten)]
        pub conversation: Conversation,
        pub messages: Vec<Message>,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Message {
        pub id: Uuid,
        pub conversation_id: Uuid,
        pub role: MessageRole,
        pub content: String,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Message> for Message {
        fn from(message: entities::Message) -> Self {
            Message {
                id: message.id,
                conversation_id: message.conversation_id,
                role: message.role,
                content: message.content,
                created_at: message.created_at,
            }
        }
    }
}
