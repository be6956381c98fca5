use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::state::AppState;

// Headroom over the upstream timeout so a slow Facturama call surfaces as its
// own 504 before the whole request is cut.
const DEADLINE_GRACE: Duration = Duration::from_secs(5);

/// Whole-request deadline. Dropping the handler future also aborts the
/// in-flight upstream call.
pub async fn request_deadline_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let deadline = state.request_timeout + DEADLINE_GRACE;
    let path = req.uri().path().to_string();

    match tokio::time::timeout(deadline, next.run(req)).await {
        Ok(resp) => resp,
        Err(_elapsed) => {
            warn!("Request to {} exceeded {}s deadline", path, deadline.as_secs());
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(ErrorResponse {
                    error: format!("La solicitud excedió el límite de {}s", deadline.as_secs()),
                }),
            )
                .into_response()
        }
    }
}
