//! HTTP client for the generative-AI service

use crate::config::GatewayConfig;
use crate::core::assistant::{ChatMessage, ProfileContext};
use crate::core::error::GatewayError;
use crate::core::identity::Role;
use crate::infrastructure::traits::AiInferenceClient;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use log::warn;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TITLE_PATH: &str = "/ai/generate-title";
const RESPONSE_PATH: &str = "/ai/get-response";

#[derive(Serialize)]
struct TitleRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct TitleResponse {
    title: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireProfileContext<'a> {
    full_name: &'a str,
    username: &'a str,
    email: &'a str,
    role: Role,
    canvas_api_key: Option<&'a str>,
    is_student: bool,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
    user_profile: WireProfileContext<'a>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

pub struct HttpAiInferenceClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[injectable(AiInferenceClient)]
impl HttpAiInferenceClient {
    #[inject]
    pub fn create(config: Ref<GatewayConfig>) -> Self {
        Self::new(config.inference_service_url.clone(), config.upstream_timeout)
    }
}

impl HttpAiInferenceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Upstream("inference service timed out".to_owned())
                } else {
                    GatewayError::Upstream(format!("inference service unreachable: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("inference service responded to {path} with {status}: {body}");
            return Err(GatewayError::Upstream(format!(
                "inference service responded with {status}"
            )));
        }

        response.json().await.map_err(|e| {
            GatewayError::Upstream(format!("malformed inference response from {path}: {e}"))
        })
    }
}

#[async_trait]
impl AiInferenceClient for HttpAiInferenceClient {
    async fn generate_title(&self, prompt: &str) -> Result<String, GatewayError> {
        let response: TitleResponse = self.post(TITLE_PATH, &TitleRequest { prompt }).await?;
        Ok(response.title)
    }

    async fn generate_completion(
        &self,
        history: &[ChatMessage],
        profile: &ProfileContext,
    ) -> Result<String, GatewayError> {
        let request = CompletionRequest {
            messages: history,
            user_profile: WireProfileContext {
                full_name: &profile.full_name,
                username: &profile.username,
                email: &profile.email,
                role: profile.role,
                canvas_api_key: profile
                    .canvas_api_key
                    .as_ref()
                    .map(|key| key.expose_secret()),
                is_student: profile.is_student,
            },
        };

        let response: CompletionResponse = self.post(RESPONSE_PATH, &request).await?;
        Ok(response.content)
    }
}
