//! Conversation context handed to the inference service.

use crate::core::identity::{Role, UserProfile};
use crate::infrastructure::entities;
use crate::infrastructure::entities::MessageRole;
use secrecy::SecretString;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl From<entities::Message> for ChatMessage {
    fn from(m: entities::Message) -> Self {
        Self {
            role: m.role,
            content: m.content,
        }
    }
}

/// The slice of a profile the inference service is allowed to see. Never carries the credit
/// balance.
#[derive(Debug)]
pub struct ProfileContext {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub canvas_api_key: Option<SecretString>,
    pub is_student: bool,
}

impl From<UserProfile> for ProfileContext {
    fn from(snapshot: UserProfile) -> Self {
        let UserProfile { user, profile } = snapshot;

        ProfileContext {
            full_name: user.full_name,
            username: user.username,
            email: user.email,
            role: user.role,
            canvas_api_key: profile.canvas_api_key,
            is_student: profile.is_student,
        }
    }
}
