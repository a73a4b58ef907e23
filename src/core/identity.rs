//! Caller identity and profile snapshots, as owned by the auth service.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Only plain users pay for chat turns.
    pub fn is_billable(self) -> bool {
        match self {
            Role::User => true,
            Role::Admin | Role::SuperAdmin => false,
        }
    }
}

/// Bearer credential, forwarded verbatim to the auth service.
#[derive(Debug)]
pub struct Credential(SecretString);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub role: Role,
}

#[derive(Debug)]
pub struct Profile {
    pub credits: u64,
    pub canvas_api_key: Option<SecretString>,
    pub is_student: bool,
}

/// Snapshot returned by the auth service's profile endpoint, read once per turn.
#[derive(Debug)]
pub struct UserProfile {
    pub user: User,
    pub profile: Profile,
}
