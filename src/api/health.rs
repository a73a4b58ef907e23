//! Liveness endpoint

use crate::api::response::ApiResponse;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;

pub fn router() -> Router {
    Router::new().route("/", get(health_check))
}

async fn health_check() -> ApiResponse<&'static str> {
    ApiResponse::new(StatusCode::OK, "OK", "Health Check Passed")
}
