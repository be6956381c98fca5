//! Error handling shared by the proxy crates

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, AppError>;

/// Body of every locally generated error: `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("Error al serializar JSON")]
    Serialization(#[from] serde_json::Error),

    #[error("Error creando solicitud")]
    RequestBuild { message: String },

    #[error("Error al contactar {service}")]
    UpstreamUnavailable { service: String },

    #[error("Error al interpretar respuesta de {service}")]
    InvalidUpstreamResponse { service: String, message: String },

    #[error("Error al decodificar contenido base64")]
    Decode { message: String },

    #[error("Tiempo de espera agotado: {operation}")]
    Timeout { operation: String },

    #[error("Servicio no configurado: {service}")]
    NotConfigured { service: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn request_build(message: impl Into<String>) -> Self {
        Self::RequestBuild {
            message: message.into(),
        }
    }

    pub fn upstream_unavailable(service: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
        }
    }

    pub fn invalid_upstream_response(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUpstreamResponse {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    pub fn not_configured(service: impl Into<String>) -> Self {
        Self::NotConfigured {
            service: service.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RequestBuild { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidUpstreamResponse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Decode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::BadRequest { .. } => "BAD_REQUEST",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::RequestBuild { .. } => "REQUEST_BUILD_ERROR",
            AppError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            AppError::InvalidUpstreamResponse { .. } => "INVALID_UPSTREAM_RESPONSE",
            AppError::Decode { .. } => "DECODE_ERROR",
            AppError::Timeout { .. } => "TIMEOUT",
            AppError::NotConfigured { .. } => "NOT_CONFIGURED",
            AppError::Configuration { .. } => "CONFIG_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::InvalidUpstreamResponse { message, .. }
            | AppError::Decode { message }
            | AppError::RequestBuild { message } => {
                tracing::error!("API Error: {} - {} ({})", self.error_code(), self, message);
            }
            _ if status.is_client_error() => {
                tracing::warn!("API Error: {} - {}", self.error_code(), self);
            }
            _ => {
                tracing::error!("API Error: {} - {}", self.error_code(), self);
            }
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn bad_request_keeps_message_verbatim() {
        let (status, body) = body_of(AppError::bad_request("Datos JSON inválidos")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "Datos JSON inválidos"}));
    }

    #[tokio::test]
    async fn upstream_failures_are_generic_500s() {
        let (status, body) = body_of(AppError::upstream_unavailable("Facturama")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error al contactar Facturama");

        let (status, body) =
            body_of(AppError::invalid_upstream_response("Facturama", "expected value at line 1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        // parser details stay in the logs
        assert_eq!(body["error"], "Error al interpretar respuesta de Facturama");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::decode("bad").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::timeout("x").status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            AppError::not_configured("sandbox").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(AppError::request_build("x").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
