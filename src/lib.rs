use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod middleware;
pub mod models;
pub mod monitoring;
pub mod services;
pub mod state;

use api::create_api_router;
use middleware::request_deadline_middleware;
use monitoring::monitoring_router;
use state::AppState;

use axum::middleware as axum_middleware;

pub fn create_app_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        // Endpoints de monitoreo
        .merge(monitoring_router())
        // API endpoints con estado
        .merge(create_api_router())
        .with_state(app_state.clone())
        .layer(axum_middleware::from_fn_with_state(
            app_state,
            request_deadline_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
