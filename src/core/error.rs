//! Gateway error taxonomy

use crate::infrastructure::traits::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed input, caught before any mutation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing, invalid or expired credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Conversation absent or not owned by the caller.
    #[error("{0}")]
    NotFound(String),

    #[error("insufficient credits")]
    InsufficientCredits,

    /// Auth or inference service unreachable, timed out or misbehaving.
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Short, stable name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation",
            GatewayError::Unauthorized(_) => "unauthorized",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::InsufficientCredits => "insufficient_credits",
            GatewayError::Upstream(_) => "upstream",
            GatewayError::Persistence(_) => "persistence",
            GatewayError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => GatewayError::NotFound("Conversation Not Found".to_owned()),
            StoreError::Database(e) => GatewayError::Persistence(e.to_string()),
        }
    }
}
