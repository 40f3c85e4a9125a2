//! # REST API for Health Checks

use axum::{response::Json, routing::get, Router};

use crate::AppState;
use shared::HealthResponse;

/// Create a router for the health endpoint
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Report that the service is up, with its name and version
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
