// CFDI API Module
// Pass-through endpoints over the Facturama REST API

pub mod handlers;
pub mod models;

pub use handlers::*;
pub use models::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use crate::state::AppState;

/// Create the CFDI router (mounted under `/api`)
pub fn create_cfdi_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cfdi", post(create_cfdi_handler).get(list_cfdis_handler))
        .route("/sandbox/cfdi", post(create_sandbox_cfdi_handler))
        .route("/cfdi/:id/download", get(download_cfdi_handler))
}
