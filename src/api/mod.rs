//! API endpoints
//!
//! Este módulo contiene los endpoints de la API.

pub mod analytics;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_layer;
use crate::state::AppState;

/// Crear el router principal de la API, ya con estado y capas
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/analytics", analytics::create_analytics_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check simple
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "service": "fuel-analytics",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
