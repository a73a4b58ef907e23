use crate::core::error::GatewayError;
use crate::core::identity::{Credential, User};
use crate::infrastructure::traits::AuthProfileClient;
use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Json, Path, Request};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use di_axum::Inject;
use serde::Deserialize;
use uuid::Uuid;

pub mod conversations;
pub mod health;
pub mod response;

const ACCESS_TOKEN_COOKIE: &str = "accessToken";
const BEARER_PREFIX: &str = "Bearer ";

pub const MAX_PROMPT_CHARS: usize = 10_000;

/// Bearer credential from the `accessToken` cookie or, failing that, the `Authorization` header.
#[derive(Debug)]
pub struct ExtractCredential(pub Credential);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractCredential
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, GatewayError> {
        if let Some(token) = cookie_token(parts) {
            return Ok(ExtractCredential(Credential::new(token)));
        }

        if let Some(header) = parts.headers.get(AUTHORIZATION) {
            let header = header
                .to_str()
                .map_err(|_| GatewayError::Unauthorized("invalid authorization header".to_owned()))?;
            let token = header.strip_prefix(BEARER_PREFIX).unwrap_or(header).trim();
            if !token.is_empty() {
                return Ok(ExtractCredential(Credential::new(token)));
            }
        }

        Err(GatewayError::Unauthorized("Unauthorized".to_owned()))
    }
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == ACCESS_TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

/// The authenticated caller, resolved through the auth service.
#[derive(Debug)]
pub struct ExtractCaller {
    pub user: User,
    pub credential: Credential,
}

#[async_trait]
impl<S> FromRequestParts<S> for ExtractCaller
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, GatewayError> {
        let ExtractCredential(credential) =
            ExtractCredential::from_request_parts(parts, state).await?;
        let Inject(auth) = Inject::<dyn AuthProfileClient>::from_request_parts(parts, state)
            .await
            .map_err(|_| GatewayError::Internal("auth client unavailable".to_owned()))?;

        let user = auth.fetch_user(&credential).await?;

        Ok(ExtractCaller { user, credential })
    }
}

#[derive(Debug)]
pub struct ExtractConversationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractConversationId
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, GatewayError> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| GatewayError::Validation("invalid conversation id".to_owned()))?;

        Ok(ExtractConversationId(id))
    }
}

#[derive(Deserialize)]
struct PromptBody {
    prompt: String,
}

/// `{ "prompt": string }` body, non-blank and at most [`MAX_PROMPT_CHARS`] characters.
#[derive(Debug)]
pub struct ExtractPrompt(pub String);

#[async_trait]
impl<S> FromRequest<S> for ExtractPrompt
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, GatewayError> {
        let Json(body) = Json::<PromptBody>::from_request(req, state)
            .await
            .map_err(|rejection| GatewayError::Validation(rejection.body_text()))?;

        validate_prompt(body.prompt).map(ExtractPrompt)
    }
}

pub fn validate_prompt(prompt: String) -> Result<String, GatewayError> {
    if prompt.trim().is_empty() {
        return Err(GatewayError::Validation("prompt must not be empty".to_owned()));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(GatewayError::Validation(format!(
            "prompt must be at most {MAX_PROMPT_CHARS} characters"
        )));
    }

    Ok(prompt)
}
