use axum::{
    body::{Body, Bytes},
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use shared::{AppError, Result, UpstreamResponse};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::cfdi::models::{is_valid_file_id, CfdiListQuery, DownloadQuery, FileEnvelope, FileFormat};
use crate::models::cfdi::CfdiRequest;
use crate::services::InvoicingClient;
use crate::state::AppState;

const UPSTREAM_SERVICE: &str = "Facturama";

type QueryPairs = std::result::Result<Query<Vec<(String, String)>>, QueryRejection>;
type RawBody = std::result::Result<Bytes, BytesRejection>;

// ============================================================================
// HANDLER FUNCTIONS
// ============================================================================

/// POST /api/cfdi
///
/// Forwards the invoice to Facturama with the production credentials.
pub async fn create_cfdi_handler(
    State(state): State<Arc<AppState>>,
    payload: RawBody,
) -> Result<Response> {
    let request = parse_cfdi_payload(payload)?;
    create_with(state.facturama.as_ref(), &request).await
}

/// POST /api/sandbox/cfdi
///
/// Same contract as the production endpoint, against the sandbox account.
pub async fn create_sandbox_cfdi_handler(
    State(state): State<Arc<AppState>>,
    payload: RawBody,
) -> Result<Response> {
    let request = parse_cfdi_payload(payload)?;
    let sandbox = state
        .facturama_sandbox
        .as_ref()
        .ok_or_else(|| AppError::not_configured("Facturama sandbox"))?;
    create_with(sandbox.as_ref(), &request).await
}

/// GET /api/cfdi
pub async fn list_cfdis_handler(
    State(state): State<Arc<AppState>>,
    query: QueryPairs,
) -> Result<Response> {
    let filters = CfdiListQuery::from_pairs(&query_pairs(query)?);
    let reply = state.facturama.list_cfdis(&filters).await?;
    relay_json(reply)
}

/// GET /api/cfdi/:id/download?format=xml|pdf&type=issued
///
/// Facturama answers with a JSON envelope holding the file as base64; the
/// caller gets the decoded bytes as an attachment.
pub async fn download_cfdi_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: QueryPairs,
) -> Result<Response> {
    let query = DownloadQuery::from_pairs(&query_pairs(query)?);

    if !is_valid_file_id(&id) {
        return Err(AppError::bad_request("Identificador de CFDI inválido"));
    }

    let format: FileFormat = query
        .format
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| AppError::bad_request("Formato inválido. Usa 'xml' o 'pdf'"))?;

    let cfdi_type = query
        .cfdi_type
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Parámetro 'type' requerido (ej. issued)"))?;

    let reply = state.facturama.fetch_file(format, &cfdi_type, &id).await?;
    if reply.is_error() {
        return Ok(relay_verbatim(reply));
    }

    let envelope: FileEnvelope = serde_json::from_slice(&reply.body)
        .map_err(|e| AppError::invalid_upstream_response(UPSTREAM_SERVICE, e.to_string()))?;

    let data = decode_content(&envelope.content)?;

    info!("Serving {} for CFDI {} ({} bytes)", format, id, data.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, format.attachment_header(&id)),
        ],
        data,
    )
        .into_response())
}

// ============================================================================
// HELPERS
// ============================================================================

/// The body is decoded whatever the declared content type; only its JSON
/// shape matters.
fn parse_cfdi_payload(payload: RawBody) -> Result<CfdiRequest> {
    let body = payload.map_err(|rejection| {
        warn!("Could not read CFDI payload: {}", rejection.body_text());
        AppError::bad_request("Datos JSON inválidos")
    })?;

    serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected CFDI payload: {}", e);
        AppError::bad_request("Datos JSON inválidos")
    })
}

fn query_pairs(query: QueryPairs) -> Result<Vec<(String, String)>> {
    query.map(|Query(pairs)| pairs).map_err(|rejection| {
        warn!("Rejected query string: {}", rejection.body_text());
        AppError::bad_request("Parámetros de consulta inválidos")
    })
}

/// Line-wrapped base64 (CRLF every 76 chars) is accepted.
fn decode_content(content: &str) -> Result<Vec<u8>> {
    let compact: Vec<u8> = content
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| AppError::decode(e.to_string()))
}

async fn create_with(client: &dyn InvoicingClient, request: &CfdiRequest) -> Result<Response> {
    let reply = client.create_cfdi(request).await?;
    relay_json(reply)
}

/// Upstream errors go back untouched; successful bodies must be JSON and are
/// always answered with 200.
fn relay_json(reply: UpstreamResponse) -> Result<Response> {
    if reply.is_error() {
        return Ok(relay_verbatim(reply));
    }

    let value: serde_json::Value = serde_json::from_slice(&reply.body)
        .map_err(|e| AppError::invalid_upstream_response(UPSTREAM_SERVICE, e.to_string()))?;

    Ok((StatusCode::OK, Json(value)).into_response())
}

fn relay_verbatim(reply: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(reply.body));
    *response.status_mut() = reply.status;

    if let Some(value) = reply
        .content_type
        .and_then(|ct| header::HeaderValue::from_str(&ct).ok())
    {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }

    response
}
