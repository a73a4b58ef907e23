//! Conversation gateway - library exports for testing
//!
//! (c) Softlandia 2025

pub mod api;
pub mod config;
pub mod core;
pub mod infrastructure;

use crate::config::GatewayConfig;
use crate::core::orchestrator::GatewayResponseOrchestrator;
use crate::core::services::GatewayConversationService;
use crate::infrastructure::auth_client::HttpAuthProfileClient;
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::inference_client::HttpAiInferenceClient;
use crate::infrastructure::repositories::DbConversationStore;
use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use di::{Injectable, Ref, ServiceCollection, ServiceProvider, ValidationError, singleton_factory};
use di_axum::RouterServiceProviderExtensions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Registers every gateway component, with `config` as the single source of settings.
pub fn build_provider(config: GatewayConfig) -> Result<ServiceProvider, ValidationError> {
    let config = Ref::new(config);

    ServiceCollection::new()
        .add(singleton_factory(move |_| config.clone()))
        .add(DatabaseConnection::singleton())
        .add(DbConversationStore::scoped())
        .add(HttpAuthProfileClient::singleton())
        .add(HttpAiInferenceClient::singleton())
        .add(GatewayConversationService::scoped())
        .add(GatewayResponseOrchestrator::scoped())
        .build_provider()
}

pub fn app(provider: ServiceProvider, config: &GatewayConfig) -> Router {
    Router::new()
        .nest("/health-check", api::health::router())
        .nest("/conversations", api::conversations::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(AllowOrigin::list(config.cors_origins.clone()))
                .allow_credentials(true),
        )
        .with_provider(provider)
}
