//! HTTP client for the auth/profile service

use crate::config::GatewayConfig;
use crate::core::error::GatewayError;
use crate::core::identity::{Credential, Profile, Role, User, UserProfile};
use crate::infrastructure::traits::AuthProfileClient;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use log::warn;
use reqwest::{Response, StatusCode};
use secrecy::SecretString;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_PATH: &str = "/users/getUser";
const PROFILE_PATH: &str = "/profile";
const USE_CREDIT_PATH: &str = "/profile/use-credit";

/// The auth service wraps payloads in the same `{statusCode, data, message, success}` envelope
/// this gateway produces.
#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    full_name: String,
    email: String,
    username: String,
    role: Role,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProfile {
    credits: u64,
    #[serde(default)]
    canvas_api_key: Option<String>,
    #[serde(default)]
    is_student: bool,
}

#[derive(Deserialize)]
struct WireUserProfile {
    #[serde(flatten)]
    user: WireUser,
    profile: WireProfile,
}

impl From<WireUser> for User {
    fn from(wire: WireUser) -> Self {
        User {
            id: wire.id,
            full_name: wire.full_name,
            email: wire.email,
            username: wire.username,
            role: wire.role,
        }
    }
}

impl From<WireUserProfile> for UserProfile {
    fn from(wire: WireUserProfile) -> Self {
        UserProfile {
            user: wire.user.into(),
            profile: Profile {
                credits: wire.profile.credits,
                canvas_api_key: wire
                    .profile
                    .canvas_api_key
                    .filter(|key| !key.is_empty())
                    .map(SecretString::from),
                is_student: wire.profile.is_student,
            },
        }
    }
}

pub struct HttpAuthProfileClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[injectable(AuthProfileClient)]
impl HttpAuthProfileClient {
    #[inject]
    pub fn create(config: Ref<GatewayConfig>) -> Self {
        Self::new(config.auth_service_url.clone(), config.upstream_timeout)
    }
}

impl HttpAuthProfileClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: &Credential,
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(credential.expose())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let response = reject_failure(response, path).await?;

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            GatewayError::Upstream(format!("malformed auth service response from {path}: {e}"))
        })?;

        envelope.data.ok_or_else(|| {
            GatewayError::Upstream(format!(
                "auth service returned no data from {path}: {}",
                envelope.message.unwrap_or_default()
            ))
        })
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Upstream("auth service timed out".to_owned())
    } else {
        GatewayError::Upstream(format!("auth service unreachable: {e}"))
    }
}

/// Maps non-success statuses onto the gateway's error taxonomy.
async fn reject_failure(response: Response, path: &str) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message);
    warn!("auth service responded to {path} with {status}");

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized(
            message.unwrap_or_else(|| "Invalid Access Token".to_owned()),
        ),
        StatusCode::PAYMENT_REQUIRED => GatewayError::InsufficientCredits,
        _ => GatewayError::Upstream(format!("auth service responded with {status}")),
    })
}

#[async_trait]
impl AuthProfileClient for HttpAuthProfileClient {
    async fn fetch_user(&self, credential: &Credential) -> Result<User, GatewayError> {
        self.get_data::<WireUser>(USER_PATH, credential)
            .await
            .map(User::from)
    }

    async fn fetch_profile(&self, credential: &Credential) -> Result<UserProfile, GatewayError> {
        self.get_data::<WireUserProfile>(PROFILE_PATH, credential)
            .await
            .map(UserProfile::from)
    }

    async fn debit_one_credit(&self, credential: &Credential) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url(USE_CREDIT_PATH))
            .bearer_auth(credential.expose())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;

        reject_failure(response, USE_CREDIT_PATH).await.map(|_| ())
    }
}
