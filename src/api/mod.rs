pub mod cfdi;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new().nest("/api", cfdi::create_cfdi_router())
}
