use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::state::AppState;

/// Create monitoring router with the health endpoint
pub fn monitoring_router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

/// Liveness only: Facturama itself is not probed.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = serde_json::json!({
        "status": "healthy",
        "service": "facturama_proxy",
        "version": env!("CARGO_PKG_VERSION"),
        "sandbox_enabled": state.facturama_sandbox.is_some(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, axum::Json(health))
}
